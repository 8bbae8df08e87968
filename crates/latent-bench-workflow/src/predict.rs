use std::fs;
use std::io::IsTerminal;
use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use latent_bench_core::Estimator;
use latent_bench_io::{indicator_matrix, IoError, LatentArchive, MetaTable};
use latent_bench_metrics::Scorer;
use latent_bench_plot::{plot_bar, BarPlotStyle, Figure, Palette};
use latent_bench_selection::{GridSearch, MultilabelStratifiedShuffleSplit, ParamGrid, Split};
use latent_bench_stats::{pairwise_ttests, PairwiseRow};
use ndarray::{Array1, ArrayView2, Axis};

use crate::config::PredictConfig;
use crate::error::{WorkflowError, WorkflowResult};
use crate::predictor::{Predictor, TargetData};
use crate::report::{write_cv_records, write_pairwise, write_scores, CvRecord, TargetScores};

/// Everything a benchmark run produced.
#[derive(Debug, Clone)]
pub struct PredictReport {
    pub scores: Vec<TargetScores>,
    pub cv_records: Vec<CvRecord>,
    pub pairwise: Vec<PairwiseRow>,
    pub predict_path: PathBuf,
    pub cv_path: PathBuf,
    pub figure_path: Option<PathBuf>,
    pub pairwise_path: Option<PathBuf>,
}

struct Inputs {
    test: LatentArchive,
    train: LatentArchive,
    meta_test: MetaTable,
    meta_train: MetaTable,
    n_draws: usize,
}

struct DrawOutcome {
    best_score: f64,
    std_best: f64,
    params: String,
    test_score: f64,
}

fn sorted_owned(names: Vec<&str>) -> Vec<String> {
    names.into_iter().map(str::to_string).collect()
}

fn load_inputs(config: &PredictConfig) -> WorkflowResult<Inputs> {
    let test = LatentArchive::open(config.latent_path("test"))?;
    let train = LatentArchive::open(config.latent_path("train"))?;
    if test.sorted_keys() != train.sorted_keys() {
        return Err(WorkflowError::KeyMismatch {
            test: sorted_owned(test.sorted_keys()),
            train: sorted_owned(train.sorted_keys()),
        });
    }
    if test.is_empty() {
        return Err(IoError::Malformed {
            path: config.latent_path("test"),
            reason: "archive holds no latent arrays".into(),
        }
        .into());
    }

    let meta_test = MetaTable::from_tsv(config.meta_path("test"))?;
    let meta_train = MetaTable::from_tsv(config.meta_path("train"))?;
    if meta_test.sorted_columns() != meta_train.sorted_columns() {
        return Err(WorkflowError::ColumnMismatch {
            test: sorted_owned(meta_test.sorted_columns()),
            train: sorted_owned(meta_train.sorted_columns()),
        });
    }

    let mut n_draws = None;
    for (key, samples_test) in test.iter() {
        let samples_train = train.get(key).ok_or_else(|| WorkflowError::KeyMismatch {
            test: sorted_owned(test.sorted_keys()),
            train: sorted_owned(train.sorted_keys()),
        })?;
        let (draws, n_train, dim_train) = samples_train.dim();
        let (draws_test, n_test, dim_test) = samples_test.dim();
        if dim_train != dim_test {
            return Err(WorkflowError::LatentDimMismatch {
                key: key.to_string(),
                train: dim_train,
                test: dim_test,
            });
        }
        let expected = *n_draws.get_or_insert(draws);
        for got in [draws, draws_test] {
            if got != expected {
                return Err(WorkflowError::DrawMismatch {
                    key: key.to_string(),
                    expected,
                    got,
                });
            }
        }
        for (split, subjects, rows) in [
            ("train", n_train, meta_train.n_rows()),
            ("test", n_test, meta_test.n_rows()),
        ] {
            if subjects != rows {
                return Err(WorkflowError::SubjectMismatch {
                    key: key.to_string(),
                    split,
                    subjects,
                    rows,
                });
            }
        }
    }

    Ok(Inputs {
        test,
        train,
        meta_test,
        meta_train,
        n_draws: n_draws.unwrap_or(0),
    })
}

fn progress_bar(len: u64, message: String) -> ProgressBar {
    let draw_target = if std::io::stderr().is_terminal() {
        ProgressDrawTarget::stderr_with_hz(20)
    } else {
        ProgressDrawTarget::hidden()
    };
    let pb = ProgressBar::with_draw_target(Some(len), draw_target);
    let style = ProgressStyle::with_template(
        "> [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
    )
    .map(|s| s.progress_chars("█▉▊▋▌▍▎▏  "))
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message(message);
    pb
}

#[allow(clippy::too_many_arguments)]
fn evaluate_draw<E: Estimator>(
    estimator: &E,
    grid: &ParamGrid,
    scorer: Scorer,
    splits: &[Split],
    x_train: ArrayView2<'_, f64>,
    y_train: &Array1<f64>,
    x_test: ArrayView2<'_, f64>,
    y_test: &Array1<f64>,
) -> WorkflowResult<DrawOutcome> {
    let search = GridSearch::new(estimator.clone(), grid.clone(), scorer, splits.to_vec())
        .with_train_score(true);
    let result = search.fit(x_train, y_train.view())?;
    let test_score = if y_test.is_empty() {
        f64::NAN
    } else {
        scorer
            .for_report()
            .score(&result.best_estimator, x_test, y_test.view())?
    };
    Ok(DrawOutcome {
        best_score: result.best_score,
        std_best: result.best_std(),
        params: result.best_params.to_json()?,
        test_score,
    })
}

/// Compare latent embeddings by how well each predicts every target.
///
/// For every target and latent key, each draw is fitted with a grid search over
/// stratified shuffle splits of the training subjects and scored on the test
/// subjects. Scores and search summaries are written as TSV to `outdir`
/// together with an annotated bar plot per target.
pub fn benchmark_pred_exp(config: &PredictConfig) -> WorkflowResult<PredictReport> {
    config.validate()?;
    log::info!(
        "COMPARE MODELS USING REGRESSIONS OR CLASSIFICATION WITH ML ANALYSIS: {}",
        config.dataset
    );
    fs::create_dir_all(&config.outdir).map_err(|source| WorkflowError::CreateDir {
        path: config.outdir.clone(),
        source,
    })?;
    log::info!("Benchmark directory: {}", config.outdir.display());

    log::info!("Loading data...");
    let inputs = load_inputs(config)?;
    let keys: Vec<String> = inputs.test.keys().map(str::to_string).collect();
    let targets = match &config.targets {
        Some(targets) => targets.clone(),
        None => inputs.meta_train.columns().to_vec(),
    };
    let stratify = config.stratify_columns()?;
    let labels = indicator_matrix(&inputs.meta_train, &stratify)?;
    let shuffle_split =
        MultilabelStratifiedShuffleSplit::new(config.n_splits, config.test_size, config.seed);

    log::info!("Train model...");
    let mut scores = Vec::with_capacity(targets.len());
    let mut cv_records = Vec::new();
    for qname in &targets {
        let target = TargetData::prepare(
            &inputs.meta_train.column(qname)?,
            &inputs.meta_test.column(qname)?,
        )?;
        let predictor = Predictor::for_kind(target.kind);
        let scorer = predictor.scorer();
        let grid = predictor.param_grid();
        let kept_labels = labels.select(Axis(0), &target.train_rows);
        let splits = shuffle_split.split(kept_labels.view())?;

        let mut latents = Vec::with_capacity(keys.len());
        for key in &keys {
            log::info!("- {} - {}...", qname, key);
            let (Some(samples_train), Some(samples_test)) =
                (inputs.train.get(key), inputs.test.get(key))
            else {
                continue;
            };
            let pb = progress_bar(inputs.n_draws as u64, format!("{} - {}", qname, key));
            let mut res = Vec::with_capacity(inputs.n_draws);
            for draw in 0..inputs.n_draws {
                let x_train = samples_train
                    .index_axis(Axis(0), draw)
                    .select(Axis(0), &target.train_rows);
                let x_test = samples_test
                    .index_axis(Axis(0), draw)
                    .select(Axis(0), &target.test_rows);
                let outcome = match &predictor {
                    Predictor::Classifier(est) => evaluate_draw(
                        est,
                        &grid,
                        scorer,
                        &splits,
                        x_train.view(),
                        &target.y_train,
                        x_test.view(),
                        &target.y_test,
                    )?,
                    Predictor::Regressor(est) => evaluate_draw(
                        est,
                        &grid,
                        scorer,
                        &splits,
                        x_train.view(),
                        &target.y_train,
                        x_test.view(),
                        &target.y_test,
                    )?,
                };
                log::debug!(
                    "{} {} draw {}: best {:.4} (std {:.4}) {} test {}",
                    qname,
                    key,
                    draw,
                    outcome.best_score,
                    outcome.std_best,
                    outcome.params,
                    outcome.test_score
                );
                cv_records.push(CvRecord {
                    model: draw,
                    best_score: format!("{:.4}", outcome.best_score),
                    std_best: format!("{:.4}", outcome.std_best),
                    params: outcome.params,
                    qname: qname.clone(),
                    latent: key.clone(),
                });
                res.push(outcome.test_score);
                pb.inc(1);
            }
            pb.finish_and_clear();
            latents.push((key.clone(), res));
        }
        scores.push(TargetScores {
            qname: qname.clone(),
            metric: scorer.name().to_string(),
            latents,
        });
    }

    let predict_path = config
        .outdir
        .join(format!("predict_{}.tsv", config.dataset));
    write_scores(&predict_path, &keys, &scores)?;
    let cv_path = config
        .outdir
        .join(format!("predict_cv_{}.tsv", config.dataset));
    write_cv_records(&cv_path, &cv_records)?;

    log::info!("Display statistics...");
    let mut pairwise = Vec::new();
    let figure_path = if config.figure {
        let path = config
            .outdir
            .join(format!("predict_{}.png", config.dataset));
        draw_figure(config, &path, &scores, &mut pairwise)?;
        log::info!("PREDICT: {}", path.display());
        Some(path)
    } else {
        if config.report_t || config.pairwise_stars {
            for target in &scores {
                pairwise.extend(pairwise_ttests(&target.qname, &target.conditions()));
            }
        }
        None
    };

    let pairwise_path = if pairwise.is_empty() {
        None
    } else {
        let path = config.outdir.join("predict_pairwise_stats.tsv");
        write_pairwise(&path, &pairwise)?;
        Some(path)
    };

    Ok(PredictReport {
        scores,
        cv_records,
        pairwise,
        predict_path,
        cv_path,
        figure_path,
        pairwise_path,
    })
}

fn draw_figure(
    config: &PredictConfig,
    path: &std::path::Path,
    scores: &[TargetScores],
    pairwise: &mut Vec<PairwiseRow>,
) -> WorkflowResult<()> {
    let suptitle = format!("{} PREDICT RESULTS", config.dataset.to_uppercase());
    let figure = Figure::grid(path, scores.len(), 3, 4.0, 100.0, &suptitle)?;
    for (panel, target) in figure.panels().iter().zip(scores) {
        let style = BarPlotStyle {
            fontsize: 7.0,
            fontsize_star: 12.0,
            bold: true,
            line_width: 2.5,
            marker_size: 3.0,
            title: Some(target.qname.to_uppercase()),
            palette: Palette::Set2,
            report_t: config.report_t,
            do_pairwise_stars: config.pairwise_stars,
            do_one_sample_stars: config.one_sample_stars,
            yname: target.metric.clone(),
            dpi: 100.0,
            seed: config.seed,
        };
        if let Some(rows) = plot_bar(panel, &target.qname, &target.conditions(), &style)? {
            pairwise.extend(rows);
        }
    }
    figure.save()?;
    Ok(())
}
