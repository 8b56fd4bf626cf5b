use async_compression::tokio::write::{GzipEncoder, ZstdEncoder};
use perf_rotate::{convert, ErrorKind, RotateConfig, RotateError, OUTPUT_HEADER};
use std::{fs, io::Write, path::Path, process::Command};
use tokio::io::AsyncWriteExt;

fn scenario_csv(rows: usize) -> String {
    let mut csv = String::from("Case,Requests/sec,Transfer 10K/sec,Server Error,Timeout\n");
    for i in 0..rows {
        csv.push_str(&format!("label{i},R{i},T{i},0,0\n"));
    }
    csv
}

fn config_in(dir: &Path, input: &str) -> RotateConfig {
    RotateConfig {
        input: dir.join(input),
        output: dir.join("proxies-performance-rotated.csv"),
        ..Default::default()
    }
}

fn output_lines(path: &Path) -> anyhow::Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    Ok(text.split_terminator("\r\n").map(str::to_string).collect())
}

#[tokio::test]
async fn rotates_scenario_into_eight_cases() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("in.csv"), scenario_csv(32))?;
    let config = config_in(dir.path(), "in.csv");

    convert(&config).await?;

    let lines = output_lines(&config.output)?;
    assert_eq!(lines.len(), 9);
    assert_eq!(lines[0], OUTPUT_HEADER.join(","));
    assert_eq!(lines[1], "http-result-4c-monolake,R0,R1,R2,R3,T0,T1,T2,T3");
    assert_eq!(lines[4], "http-result-4c-envoy,R12,R13,R14,R15,T12,T13,T14,T15");
    assert_eq!(lines[5], "https-result-4c-monolake,R16,R17,R18,R19,T16,T17,T18,T19");
    assert_eq!(lines[8], "https-result-4c-envoy,R28,R29,R30,R31,T28,T29,T30,T31");
    Ok(())
}

#[tokio::test]
async fn values_pass_through_verbatim() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut csv = String::from("Case,Requests/sec,Transfer 10K/sec\n");
    for i in 0..32 {
        csv.push_str(&format!("case {i},\"{i},000.50\",0{i}.10MB\n"));
    }
    fs::write(dir.path().join("in.csv"), csv)?;
    let config = config_in(dir.path(), "in.csv");

    let rotated = convert(&config).await?;
    assert_eq!(&rotated.rows[0].requests[1][..], b"1,000.50");
    assert_eq!(&rotated.rows[0].transfer[0][..], b"00.10MB");

    let lines = output_lines(&config.output)?;
    assert_eq!(
        lines[2],
        "http-result-4c-nginx,\"4,000.50\",\"5,000.50\",\"6,000.50\",\"7,000.50\",04.10MB,05.10MB,06.10MB,07.10MB"
    );
    Ok(())
}

#[tokio::test]
async fn short_input_fails_without_touching_output() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("in.csv"), scenario_csv(31))?;
    let config = config_in(dir.path(), "in.csv");

    let err = convert(&config).await.unwrap_err();
    assert!(matches!(err, RotateError::TooFewRows { found: 31, required: 32 }));
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(!config.output.exists());

    fs::write(&config.output, "previous run\n")?;
    assert!(convert(&config).await.is_err());
    assert_eq!(fs::read_to_string(&config.output)?, "previous run\n");
    Ok(())
}

#[tokio::test]
async fn missing_input_is_an_io_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = config_in(dir.path(), "absent.csv");

    let err = convert(&config).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(!config.output.exists());
    Ok(())
}

#[tokio::test]
async fn gzip_input_matches_plain_input() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let gz_path = dir.path().join("in.csv.gz");
    let mut encoder = GzipEncoder::new(tokio::fs::File::create(&gz_path).await?);
    encoder.write_all(scenario_csv(32).as_bytes()).await?;
    encoder.shutdown().await?;

    let gz_config = config_in(dir.path(), "in.csv.gz");
    let from_gz = convert(&gz_config).await?;

    fs::write(dir.path().join("in.csv"), scenario_csv(32))?;
    let from_plain = convert(&config_in(dir.path(), "in.csv")).await?;

    assert_eq!(from_gz, from_plain);
    Ok(())
}

#[tokio::test]
async fn zstd_input_matches_plain_input() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let zst_path = dir.path().join("in.csv.zst");
    let mut encoder = ZstdEncoder::new(tokio::fs::File::create(&zst_path).await?);
    encoder.write_all(scenario_csv(32).as_bytes()).await?;
    encoder.shutdown().await?;

    let from_zst = convert(&config_in(dir.path(), "in.csv.zst")).await?;

    fs::write(dir.path().join("in.csv"), scenario_csv(32))?;
    let from_plain = convert(&config_in(dir.path(), "in.csv")).await?;

    assert_eq!(from_zst, from_plain);
    Ok(())
}

#[tokio::test]
async fn unwritable_output_is_an_io_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("in.csv"), scenario_csv(32))?;
    let config = RotateConfig {
        output: dir.path().join("nodir").join("out.csv"),
        ..config_in(dir.path(), "in.csv")
    };

    let err = convert(&config).await.unwrap_err();
    assert!(matches!(err, RotateError::Io(_)));
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(!config.output.exists());
    Ok(())
}

#[tokio::test]
async fn blank_line_in_data_is_rejected() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut csv = scenario_csv(4);
    csv.push('\n');
    for i in 5..33 {
        csv.push_str(&format!("label{i},R{i},T{i},0,0\n"));
    }
    fs::write(dir.path().join("in.csv"), csv)?;
    let config = config_in(dir.path(), "in.csv");

    let err = convert(&config).await.unwrap_err();
    assert!(matches!(err, RotateError::MissingField { row: 4, column: 1 }));
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(!config.output.exists());
    Ok(())
}

#[tokio::test]
async fn windows_1252_input_is_written_as_utf8() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut f = fs::File::create(dir.path().join("in.csv"))?;
    f.write_all(b"Case,Requests/sec,Transfer 10K/sec\n")?;
    for i in 0..32 {
        // 0xb5 is MICRO SIGN in windows-1252
        f.write_all(format!("label{i},R{i},{i}").as_bytes())?;
        f.write_all(b"\xb5s\n")?;
    }
    drop(f);

    let config = RotateConfig {
        charset: encoding_rs::WINDOWS_1252,
        ..config_in(dir.path(), "in.csv")
    };
    convert(&config).await?;

    let lines = output_lines(&config.output)?;
    assert_eq!(lines[1], "http-result-4c-monolake,R0,R1,R2,R3,0µs,1µs,2µs,3µs");
    Ok(())
}

#[test]
fn binary_uses_working_directory_defaults() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("proxies-performance.csv"), scenario_csv(32))?;

    let status = Command::new(env!("CARGO_BIN_EXE_rotate"))
        .current_dir(dir.path())
        .status()?;
    assert!(status.success());

    let lines = output_lines(&dir.path().join("proxies-performance-rotated.csv"))?;
    assert_eq!(lines.len(), 9);
    assert_eq!(lines[3], "http-result-4c-traefik,R8,R9,R10,R11,T8,T9,T10,T11");
    Ok(())
}

#[test]
fn binary_fails_on_short_input() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("proxies-performance.csv"), scenario_csv(5))?;

    let status = Command::new(env!("CARGO_BIN_EXE_rotate"))
        .current_dir(dir.path())
        .status()?;
    assert!(!status.success());
    assert!(!dir.path().join("proxies-performance-rotated.csv").exists());
    Ok(())
}
