use alloy_primitives::B256;
use blobspace::{
    cli::{Cli, OutputFormat},
    ABOUT,
};
use blobspace_calc::{PrefixMode, Validation};
use blobspace_source::{BlobRequest, BlobSelection};
use clap::Parser;
use std::io::{empty, Write};

const TX_HASH: &str = "0x021f91dc6e11c936ce4c785fbcc48eda94e3135f7d31766f288cdc71db8f912a";
const BLOB_HASH: &str = "0x01010893b86ebddb5fc64a836970c985f1c8a4e58ad74af1d5dff704af7c8d97";

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("blobspace").chain(args.iter().copied())).unwrap()
}

#[test]
fn data_from_argument() {
    let cli = parse(&["data", "0xff00ff00"]);
    let request = cli.request(empty()).unwrap();
    assert_eq!(request, Some(BlobRequest::Data("0xff00ff00".to_string())));
    assert_eq!(cli.calc_options().prefix_mode, PrefixMode::Compat);
    assert_eq!(cli.calc_options().validation, Validation::Permissive);
    assert_eq!(cli.output(), OutputFormat::Text);
}

#[test]
fn data_from_stdin_is_trimmed() {
    let cli = parse(&["data"]);
    let request = cli.request(&b"  0xdeadbeef\n"[..]).unwrap();
    assert_eq!(request, Some(BlobRequest::Data("0xdeadbeef".to_string())));
}

#[test]
fn data_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "0x00000000").unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let cli = parse(&["data", "--file", &path]);
    let request = cli.request(empty()).unwrap();
    assert_eq!(request, Some(BlobRequest::Data("0x00000000".to_string())));

    let cli = parse(&["data", "--file", "/nonexistent/blob.hex"]);
    let err = cli.request(empty()).unwrap_err();
    assert!(format!("{err:#}").contains("reading blob data from /nonexistent/blob.hex"));
}

#[test]
fn data_argument_and_file_conflict() {
    let res = Cli::try_parse_from(["blobspace", "data", "0xff", "--file", "blob.hex"]);
    assert!(res.is_err());
}

#[test]
fn hash_requests() {
    let cli = parse(&["blob-hash", BLOB_HASH]);
    let request = cli.request(empty()).unwrap();
    assert_eq!(request, Some(BlobRequest::BlobHash(BLOB_HASH.parse::<B256>().unwrap())));

    let tx_hash: B256 = TX_HASH.parse().unwrap();
    let cli = parse(&["tx-hash", TX_HASH]);
    assert_eq!(
        cli.request(empty()).unwrap(),
        Some(BlobRequest::Transaction { tx_hash, selection: BlobSelection::All })
    );

    let cli = parse(&["tx-hash", TX_HASH, "--index", "2"]);
    assert_eq!(
        cli.request(empty()).unwrap(),
        Some(BlobRequest::Transaction { tx_hash, selection: BlobSelection::Index(2) })
    );

    assert!(Cli::try_parse_from(["blobspace", "blob-hash", "0x1234"]).is_err());
}

#[test]
fn global_flags() {
    let cli = parse(&["data", "0xff", "--corrected", "--strict", "--output", "json"]);
    assert_eq!(cli.calc_options().prefix_mode, PrefixMode::Corrected);
    assert_eq!(cli.calc_options().validation, Validation::Strict);
    assert_eq!(cli.output(), OutputFormat::Json);

    let cli = parse(&[
        "--http-timeout-secs",
        "5",
        "--blob-api-url",
        "http://localhost:3000/blobs",
        "about",
    ]);
    let config = cli.explorer_config();
    assert_eq!(config.timeout.as_secs(), 5);
    assert_eq!(config.blob_api_url, "http://localhost:3000/blobs");
}

#[tokio::test]
async fn execute_pasted_data() {
    let cli = parse(&["data", "0xff00ff00"]);
    let out = cli.execute(empty()).await.unwrap();
    assert_eq!(
        out,
        "pasted blob data\n\
         Blob Length(bytes)  Zero Bytes  Used Percentage  Wasted Percentage\n\
         4                   2           37.50            62.50\n"
    );

    let cli = parse(&["data", "0xdeadbeef", "--corrected", "--output", "json"]);
    let out = cli.execute(empty()).await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value[0]["zero_bytes"], 0);
    assert_eq!(value[0]["used_percentage"], 100.0);
    assert_eq!(value[0]["wasted_percentage"], 0.0);
}

#[tokio::test]
async fn execute_reports_input_errors() {
    let cli = parse(&["data"]);
    let err = cli.execute(&b"\n"[..]).await.unwrap_err();
    assert_eq!(format!("{err:#}"), "analyzing pasted blob data: no blob data provided");

    let cli = parse(&["data", "0x"]);
    let err = cli.execute(empty()).await.unwrap_err();
    assert_eq!(
        format!("{err:#}"),
        "analyzing pasted blob data: blob data too short to analyze: 2 characters"
    );

    let cli = parse(&["data", "--strict", "ff00"]);
    let err = cli.execute(empty()).await.unwrap_err();
    assert!(format!("{err:#}").ends_with("blob data must start with 0x"));
}

#[tokio::test]
async fn execute_about() {
    let cli = parse(&["about"]);
    assert_eq!(cli.execute(empty()).await.unwrap(), ABOUT);
}
