use httpmock::prelude::*;
use resume_screener::core::ConfigProvider;
use resume_screener::utils::validation::Validate;
use resume_screener::{
    BatchEngine, LlmSettings, LocalStorage, OpenRouterClient, ScreeningPipeline, WorkshopConfig,
};
use std::io::Read;
use tempfile::TempDir;

const RESUMES: &str = "ID,Resume_str,Resume_html,Category\n\
1001,\"Senior backend engineer, 8 years of Rust and Go\",<div/>,INFORMATION-TECHNOLOGY\n\
1002,Recent graduate with an internship in data analysis,<div/>,INFORMATION-TECHNOLOGY\n\
1003,Chef with 10 years of restaurant experience,<div/>,CHEF\n";

fn completion(content: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "id": "gen-1",
        "choices": [{"message": {"role": "assistant", "content": content.to_string()}}],
        "usage": {"prompt_tokens": 200, "completion_tokens": 40, "total_tokens": 240}
    })
}

fn write_config(dir: &TempDir, endpoint: &str, extra: &str) -> WorkshopConfig {
    let root = dir.path().to_str().unwrap().replace('\\', "/");
    std::fs::write(dir.path().join("Resume.csv"), RESUMES).unwrap();

    let content = format!(
        r#"
[llm]
endpoint = "{endpoint}"
api_key = "sk-test"

[dataset]
resumes_path = "{root}/Resume.csv"
{extra}

[screening]
prompt = "Classify the candidate's seniority."
output_schema = '{{"seniority": "junior | senior | not_applicable", "relevant": "boolean"}}'

[load]
output_path = "{root}/out"
"#
    );
    let path = dir.path().join("workshop.toml");
    std::fs::write(&path, content).unwrap();
    WorkshopConfig::from_file(&path).unwrap()
}

fn read_entry(archive: &mut zip::ZipArchive<std::io::Cursor<Vec<u8>>>, name: &str) -> String {
    let mut content = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    content
}

#[tokio::test]
async fn test_end_to_end_screening() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();

    let senior = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/chat/completions")
            .header("authorization", "Bearer sk-test")
            .body_contains("8 years of Rust");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(completion(serde_json::json!({"seniority": "senior", "relevant": true})));
    });
    let junior = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/chat/completions")
            .body_contains("Recent graduate");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(completion(serde_json::json!({"seniority": "junior", "relevant": true})));
    });

    let config = write_config(
        &temp_dir,
        &server.url("/api/v1/chat/completions"),
        "max_resumes = 2",
    );
    config.validate_for_screening().unwrap();

    let client = OpenRouterClient::new(config.llm.clone()).unwrap();
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = ScreeningPipeline::new(storage, config, client);
    let engine = BatchEngine::new(pipeline);

    let location = engine.run().await.unwrap();

    senior.assert();
    junior.assert();
    assert!(location.ends_with("screening_results.zip"));

    let bytes = std::fs::read(temp_dir.path().join("out/screening_results.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 2);

    let csv_content = read_entry(&mut archive, "screening.csv");
    let lines: Vec<&str> = csv_content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "ID,seniority,relevant,error,prompt_tokens,completion_tokens",
            "1001,senior,true,,200,40",
            "1002,junior,true,,200,40",
        ]
    );

    let json: serde_json::Value =
        serde_json::from_str(&read_entry(&mut archive, "screening.json")).unwrap();
    assert_eq!(json["usage"]["total_tokens"], 480);
}

#[tokio::test]
async fn test_provider_errors_are_kept_per_resume() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();

    let failing = server.mock(|when, then| {
        when.method(POST).path("/chat");
        then.status(429).body(r#"{"error": "rate limited"}"#);
    });

    let config = write_config(&temp_dir, &server.url("/chat"), r#"resume_ids = ["1003"]"#);
    let client = OpenRouterClient::new(config.llm.clone()).unwrap();
    let storage = LocalStorage::new(config.output_path().to_string());
    let engine = BatchEngine::new(ScreeningPipeline::new(storage, config, client));

    engine.run().await.unwrap();
    failing.assert_hits(1);

    let bytes = std::fs::read(temp_dir.path().join("out/screening_results.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 3);

    let failures: serde_json::Value =
        serde_json::from_str(&read_entry(&mut archive, "failures.json")).unwrap();
    assert_eq!(failures[0]["id"], "1003");
    assert!(failures[0]["error"].as_str().unwrap().contains("429"));
}

#[tokio::test]
async fn test_unknown_resume_id_fails_extract() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, "http://127.0.0.1:9/chat", r#"resume_ids = ["4242"]"#);
    assert!(config.validate().is_ok());

    let client = OpenRouterClient::new(LlmSettings::new("sk-test")).unwrap();
    let storage = LocalStorage::new(config.output_path().to_string());
    let engine = BatchEngine::new(ScreeningPipeline::new(storage, config, client));

    let err = engine.run().await.unwrap_err();
    assert!(err.to_string().contains("4242"));
    assert!(!temp_dir.path().join("out/screening_results.zip").exists());
}
