use assert_cmd::Command;
use predicates::prelude::*;

fn kanjian() -> Command {
  Command::cargo_bin("kanjian").unwrap()
}

#[test]
fn help_lists_subcommands() {
  kanjian()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("image"))
    .stdout(predicate::str::contains("directory"));
}

#[test]
fn missing_subcommand_fails() {
  kanjian().assert().failure();
}

#[test]
fn missing_weights_are_reported() {
  let dir = tempfile::tempdir().unwrap();
  let weights = dir.path().join("weights").join("yolo26n.rknn");

  kanjian()
    .current_dir(dir.path())
    .args(["--model", &format!("yolo26://{}", weights.display())])
    .args(["image", "images/test_1.jpg"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("权重文件不存在"));

  assert!(!dir.path().join("output").exists());
}

#[test]
fn default_weights_location_is_relative() {
  let dir = tempfile::tempdir().unwrap();

  kanjian()
    .current_dir(dir.path())
    .arg("directory")
    .assert()
    .failure()
    .stderr(predicate::str::contains("weights/yolo26n.rknn"));
}

#[test]
fn unknown_model_scheme_is_rejected() {
  let dir = tempfile::tempdir().unwrap();
  let weights = dir.path().join("model.onnx");
  std::fs::write(&weights, b"weights").unwrap();

  kanjian()
    .args(["--model", &format!("onnx://{}", weights.display())])
    .args(["directory", &dir.path().display().to_string()])
    .assert()
    .failure()
    .stderr(predicate::str::contains("不支持的模型方案"));
}

#[test]
fn confidence_must_be_a_number() {
  kanjian()
    .args(["--confidence", "high", "directory"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("--confidence"));
}

fn write_image_and_record(dir: &std::path::Path) -> std::path::PathBuf {
  let images = dir.join("images");
  std::fs::create_dir(&images).unwrap();
  image::RgbImage::from_fn(48, 40, |x, y| image::Rgb([(x * 5) as u8, (y * 6) as u8, 90]))
    .save(images.join("test_1.png"))
    .unwrap();

  let weights = dir.join("检测 记录");
  std::fs::create_dir(&weights).unwrap();
  let record = weights.join("dog.txt");
  std::fs::write(&record, "dog, 0.87, 0.1, 0.1, 0.5, 0.5\n").unwrap();
  record
}

#[test]
fn record_model_detects_end_to_end() {
  let dir = tempfile::tempdir().unwrap();
  let record = write_image_and_record(dir.path());

  kanjian()
    .current_dir(dir.path())
    .args(["--model", &format!("record://{}", record.display())])
    .args(["image", "images/test_1.png"])
    .assert()
    .success()
    .stdout(predicate::str::contains("dog: 0.87"));

  assert!(dir.path().join("output").join("test_1.png").is_file());
  assert!(dir.path().join("preview").join("test_1.png").is_file());
}

#[test]
fn no_preview_skips_side_by_side_image() {
  let dir = tempfile::tempdir().unwrap();
  let record = write_image_and_record(dir.path());

  kanjian()
    .current_dir(dir.path())
    .args(["--model", &format!("record://{}", record.display())])
    .args(["--no-preview", "--record=id", "directory"])
    .assert()
    .success()
    .stdout(predicate::str::contains("dog: 0.87"))
    .stdout(predicate::str::contains("总图片数: 1"));

  assert!(dir.path().join("output").join("test_1.png").is_file());
  assert!(!dir.path().join("preview").exists());
  let written = std::fs::read_to_string(dir.path().join("output").join("test_1.txt")).unwrap();
  assert!(written.starts_with("16, 0.8700"));
}
