use std::fs::{self, File};
use std::path::Path;

use latent_bench_io::IoError;
use latent_bench_workflow::{benchmark_pred_exp, PredictConfig, WorkflowError};
use ndarray::Array3;
use ndarray_npy::NpzWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const N_DRAWS: usize = 2;
const LATENT_DIM: usize = 3;

struct Subject {
    site: &'static str,
    age: f64,
    sex: u8,
}

fn subjects(n: usize, rng: &mut StdRng) -> Vec<Subject> {
    (0..n)
        .map(|i| Subject {
            site: if (i / 2) % 2 == 0 { "A" } else { "B" },
            age: 8.0 + rng.gen::<f64>() * 10.0,
            sex: (i % 2) as u8,
        })
        .collect()
}

fn write_meta(path: &Path, subjects: &[Subject]) {
    write_meta_with_header(path, "site\tage\tsex", subjects);
}

fn write_meta_with_header(path: &Path, header: &str, subjects: &[Subject]) {
    let mut text = format!("{}\n", header);
    for s in subjects {
        text.push_str(&format!("{}\t{}\t{}\n", s.site, s.age, s.sex));
    }
    fs::write(path, text).unwrap();
}

/// Latents whose first two dimensions carry age and sex.
fn latents(subjects: &[Subject], noise: f64, rng: &mut StdRng) -> Array3<f64> {
    Array3::from_shape_fn((N_DRAWS, subjects.len(), LATENT_DIM), |(_, i, k)| {
        let signal = match k {
            0 => (subjects[i].age - 13.0) / 5.0,
            1 => subjects[i].sex as f64 * 2.0 - 1.0,
            _ => 0.0,
        };
        signal + noise * (rng.gen::<f64>() - 0.5)
    })
}

fn write_latents(path: &Path, arrays: &[(&str, Array3<f64>)]) {
    let mut npz = NpzWriter::new(File::create(path).unwrap());
    for (key, array) in arrays {
        npz.add_array(*key, array).unwrap();
    }
    npz.finish().unwrap();
}

fn write_dataset(dir: &Path, test_keys: &[&str]) {
    let mut rng = StdRng::seed_from_u64(7);
    let train = subjects(40, &mut rng);
    let test = subjects(20, &mut rng);
    write_meta(&dir.join("latent_meta_train_toy.tsv"), &train);
    write_meta(&dir.join("latent_meta_test_toy.tsv"), &test);

    let noise = [0.2, 2.0];
    let train_arrays: Vec<(&str, Array3<f64>)> = ["good_model", "noisy_model"]
        .iter()
        .zip(noise)
        .map(|(key, n)| (*key, latents(&train, n, &mut rng)))
        .collect();
    let test_arrays: Vec<(&str, Array3<f64>)> = test_keys
        .iter()
        .zip(noise)
        .map(|(key, n)| (*key, latents(&test, n, &mut rng)))
        .collect();
    write_latents(&dir.join("latent_vecs_train_toy.npz"), &train_arrays);
    write_latents(&dir.join("latent_vecs_test_toy.npz"), &test_arrays);
}

fn config(datadir: &Path, outdir: &Path) -> PredictConfig {
    let mut config = PredictConfig::new("toy", datadir, outdir);
    config.targets = Some(vec!["age".to_string(), "sex".to_string()]);
    config.stratify = Some(vec!["site".to_string(), "sex".to_string()]);
    config.report_t = true;
    config.figure = false;
    config
}

#[test]
fn test_benchmark_writes_reports() {
    let dir = tempfile::tempdir().unwrap();
    let outdir = dir.path().join("bench");
    write_dataset(dir.path(), &["good_model", "noisy_model"]);

    let report = benchmark_pred_exp(&config(dir.path(), &outdir)).unwrap();

    assert_eq!(report.scores.len(), 2);
    let age = &report.scores[0];
    assert_eq!(age.metric, "MAE");
    let sex = &report.scores[1];
    assert_eq!(sex.metric, "AUC ROC");
    for (_, values) in &age.latents {
        assert_eq!(values.len(), N_DRAWS);
        assert!(values.iter().all(|v| v.is_finite() && *v >= 0.0));
    }
    for (_, values) in &sex.latents {
        assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));
    }
    // the informative embedding predicts age better
    let mean = |v: &Vec<f64>| v.iter().sum::<f64>() / v.len() as f64;
    assert!(mean(&age.latents[0].1) < mean(&age.latents[1].1));

    let predict = fs::read_to_string(&report.predict_path).unwrap();
    let lines: Vec<&str> = predict.lines().collect();
    assert_eq!(lines[0], "qname\tgood_model\tnoisy_model");
    assert_eq!(lines.len(), 1 + 2 * N_DRAWS);
    assert!(lines[1].starts_with("age\t"));
    assert!(lines[3].starts_with("sex\t"));

    assert_eq!(report.cv_records.len(), 2 * 2 * N_DRAWS);
    let cv = fs::read_to_string(&report.cv_path).unwrap();
    assert!(cv.starts_with("model\tbest_score\tstd_best\tparams\tqname\tlatent\n"));
    assert_eq!(cv.lines().count(), 1 + report.cv_records.len());
    assert!(report.cv_records[0].params.contains("alpha"));
    let decimals = |s: &str| s.split('.').nth(1).map(str::len);
    assert!(report.cv_records.iter().all(|r| decimals(&r.best_score) == Some(4)));

    // two conditions per target, every ordered pair
    assert_eq!(report.pairwise.len(), 2 * 4);
    assert!(report.pairwise_path.as_ref().unwrap().exists());
    assert!(report.figure_path.is_none());
}

#[test]
fn test_mismatched_keys_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path(), &["good_model", "other_model"]);
    let err = benchmark_pred_exp(&config(dir.path(), &dir.path().join("out"))).unwrap_err();
    assert!(matches!(err, WorkflowError::KeyMismatch { .. }));
}

#[test]
fn test_missing_inputs_fail() {
    let dir = tempfile::tempdir().unwrap();
    let err = benchmark_pred_exp(&config(dir.path(), &dir.path().join("out"))).unwrap_err();
    assert!(matches!(err, WorkflowError::Io(_)));
}

#[test]
fn test_benchmark_draws_figure_with_stars() {
    let dir = tempfile::tempdir().unwrap();
    let outdir = dir.path().join("bench");
    write_dataset(dir.path(), &["good_model", "noisy_model"]);
    let mut config = config(dir.path(), &outdir);
    config.figure = true;
    config.report_t = false;
    config.pairwise_stars = true;
    config.one_sample_stars = true;

    let report = benchmark_pred_exp(&config).unwrap();

    let figure = report.figure_path.unwrap();
    assert_eq!(figure, outdir.join("predict_toy.png"));
    assert!(fs::metadata(&figure).unwrap().len() > 0);
    let pairwise = report.pairwise_path.unwrap();
    assert_eq!(pairwise, outdir.join("predict_pairwise_stats.tsv"));
    let text = fs::read_to_string(&pairwise).unwrap();
    assert_eq!(text.lines().count(), 1 + report.pairwise.len());
    assert_eq!(report.pairwise.len(), 2 * 4);
}

#[test]
fn test_meta_columns_must_agree() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path(), &["good_model", "noisy_model"]);
    let mut rng = StdRng::seed_from_u64(3);
    write_meta_with_header(
        &dir.path().join("latent_meta_test_toy.tsv"),
        "site\tage\tgender",
        &subjects(20, &mut rng),
    );

    let err = benchmark_pred_exp(&config(dir.path(), &dir.path().join("out"))).unwrap_err();
    match err {
        WorkflowError::ColumnMismatch { test, train } => {
            assert_eq!(test, ["age", "gender", "site"]);
            assert_eq!(train, ["age", "sex", "site"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_latent_dims_must_agree() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path(), &["good_model", "noisy_model"]);
    let wide = Array3::<f64>::zeros((N_DRAWS, 20, LATENT_DIM + 1));
    write_latents(
        &dir.path().join("latent_vecs_test_toy.npz"),
        &[("good_model", wide.clone()), ("noisy_model", wide)],
    );

    let err = benchmark_pred_exp(&config(dir.path(), &dir.path().join("out"))).unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::LatentDimMismatch { train: LATENT_DIM, test, .. } if test == LATENT_DIM + 1
    ));
}

#[test]
fn test_draw_counts_must_agree() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path(), &["good_model", "noisy_model"]);
    let extra = Array3::<f64>::zeros((N_DRAWS + 1, 20, LATENT_DIM));
    write_latents(
        &dir.path().join("latent_vecs_test_toy.npz"),
        &[("good_model", extra.clone()), ("noisy_model", extra)],
    );

    let err = benchmark_pred_exp(&config(dir.path(), &dir.path().join("out"))).unwrap_err();
    match err {
        WorkflowError::DrawMismatch { expected, got, .. } => {
            assert_eq!(expected, N_DRAWS);
            assert_eq!(got, N_DRAWS + 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_subject_counts_must_match_meta() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path(), &["good_model", "noisy_model"]);
    let mut rng = StdRng::seed_from_u64(5);
    write_meta(
        &dir.path().join("latent_meta_train_toy.tsv"),
        &subjects(39, &mut rng),
    );

    let err = benchmark_pred_exp(&config(dir.path(), &dir.path().join("out"))).unwrap_err();
    match err {
        WorkflowError::SubjectMismatch {
            split,
            subjects,
            rows,
            ..
        } => {
            assert_eq!(split, "train");
            assert_eq!(subjects, 40);
            assert_eq!(rows, 39);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_empty_archives_are_malformed() {
    let dir = tempfile::tempdir().unwrap();
    write_latents(&dir.path().join("latent_vecs_train_toy.npz"), &[]);
    write_latents(&dir.path().join("latent_vecs_test_toy.npz"), &[]);

    let err = benchmark_pred_exp(&config(dir.path(), &dir.path().join("out"))).unwrap_err();
    assert!(matches!(err, WorkflowError::Io(IoError::Malformed { .. })));
}

#[test]
fn test_unknown_dataset_needs_stratification() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path(), &["good_model", "noisy_model"]);
    let mut config = config(dir.path(), &dir.path().join("out"));
    config.stratify = None;

    let err = benchmark_pred_exp(&config).unwrap_err();
    match err {
        WorkflowError::MissingStratification(dataset) => assert_eq!(dataset, "toy"),
        other => panic!("unexpected error: {other}"),
    }
}
