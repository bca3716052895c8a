//! End-to-end sync runs against a mock TeamCity server
//!
//! Each test mounts a build on a wiremock server, runs the public
//! [`ArtifactDownloader`] API into a temporary directory and inspects the
//! resulting tree on disk.

mod common;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use common::{
    RELEASE_BUILD, artifact_requests, assert_file, dirs_under, download_root, files_under,
    mount_build,
};
use tcad::{
    ArtifactDownloader, CredentialField, NoPrompt, StaticPrompt, SyncConfig, SyncReport,
    SyncSummary,
};
use tempfile::TempDir;
use wiremock::MockServer;

fn release_config(url: String) -> SyncConfig {
    SyncConfig {
        url,
        build_type: "Product_Release".into(),
        username: Some("builder".into()),
        password: Some("secret".into()),
        ..Default::default()
    }
}

async fn sync(config: SyncConfig, out: &TempDir) -> (SyncSummary, String) {
    let downloader = ArtifactDownloader::new(config, out.path()).unwrap();
    let mut progress = Vec::new();
    let report = downloader.run(&NoPrompt, &mut progress).await.unwrap();
    match report {
        SyncReport::Completed(summary) => (summary, String::from_utf8(progress).unwrap()),
        SyncReport::Cancelled => panic!("run was unexpectedly cancelled"),
    }
}

#[tokio::test]
async fn release_build_is_mirrored_without_hidden_artifacts() {
    let server = MockServer::start().await;
    let root = download_root("", "Product_Release", "lastFinished");
    mount_build(&server, &root, RELEASE_BUILD).await;

    let out = TempDir::new().unwrap();
    let (summary, progress) = sync(release_config(server.uri()), &out).await;

    assert_eq!(
        files_under(out.path()),
        vec![
            "docs/api/index.html",
            "docs/manual.pdf",
            "setup.exe",
            "setup.msi",
            "symbols/app.pdb",
        ]
    );
    assert_eq!(dirs_under(out.path()), vec!["docs", "docs/api", "symbols"]);
    assert_file(out.path(), "docs/api/index.html", "<html></html>");
    assert_file(out.path(), "setup.msi", "installer bytes");

    assert_eq!(summary.downloaded(), 5);
    assert_eq!(summary.skipped_hidden, 2);
    assert_eq!(summary.skipped_glob, 0);
    assert!(progress.is_empty());
    assert_eq!(artifact_requests(&server).await.len(), 5);
}

#[tokio::test]
async fn flattened_glob_sync_collects_matches_into_one_directory() {
    let server = MockServer::start().await;
    let root = download_root("", "Product_Release", "lastFinished");
    mount_build(&server, &root, RELEASE_BUILD).await;

    let out = TempDir::new().unwrap();
    let config = SyncConfig {
        glob: "*.P?F".into(),
        flatten: true,
        out_dir: Some("drop".into()),
        verbose: true,
        ..release_config(server.uri())
    };
    let (summary, progress) = sync(config, &out).await;

    assert_eq!(files_under(out.path()), vec!["drop/manual.pdf"]);
    assert_eq!(dirs_under(out.path()), vec!["drop"]);
    assert_eq!(progress, "docs/manual.pdf\n");
    assert_eq!(summary.skipped_glob, 4);
    assert_eq!(
        artifact_requests(&server).await,
        vec![format!("{root}/docs/manual.pdf")]
    );
}

#[tokio::test]
async fn explicit_build_below_context_path_with_url_credentials() {
    let server = MockServer::start().await;
    let root = download_root("/teamcity", "Product_Release", "1234:id");
    mount_build(&server, &root, &[("setup", "msi", "installer bytes")]).await;

    let url = server
        .uri()
        .replacen("http://", "http://deploy:p%40ss@", 1)
        + "/teamcity";
    let out = TempDir::new().unwrap();
    let config = SyncConfig {
        url,
        build_type: "Product_Release".into(),
        build_id: "1234:id".into(),
        ..Default::default()
    };
    let (summary, _) = sync(config, &out).await;

    assert_eq!(summary.downloaded(), 1);
    assert_file(out.path(), "setup.msi", "installer bytes");

    let expected = format!("Basic {}", STANDARD.encode("deploy:p@ss"));
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        let auth = request.headers.get("authorization").unwrap();
        assert_eq!(auth.to_str().unwrap(), expected);
    }
}

#[tokio::test]
async fn dry_run_profile_lists_artifacts_and_creates_only_directories() {
    let server = MockServer::start().await;
    let root = download_root("", "Product_Release", "lastFinished");
    mount_build(&server, &root, RELEASE_BUILD).await;

    let profile = format!(
        "url = \"{}\"\nbuild_type = \"Product_Release\"\nusername = \"builder\"\n\
         password = \"secret\"\ndry_run = true\nverbose = true\ninclude_hidden = true\n\
         timeout = 30\n",
        server.uri()
    );
    let config = SyncConfig::from_toml_str(&profile).unwrap();

    let out = TempDir::new().unwrap();
    let (summary, progress) = sync(config, &out).await;

    assert!(summary.dry_run);
    assert_eq!(summary.artifacts.len(), 7);
    assert_eq!(summary.downloaded(), 0);
    assert_eq!(summary.total_bytes(), 0);
    assert_eq!(
        progress.lines().collect::<Vec<_>>(),
        vec![
            "setup.msi",
            "setup.exe",
            "docs/manual.pdf",
            "docs/api/index.html",
            "symbols/app.pdb",
            ".teamcity/properties/build.start.properties.gz",
            ".teamcity/logs/buildLog.msg5",
        ]
    );

    assert!(files_under(out.path()).is_empty());
    assert_eq!(
        dirs_under(out.path()),
        vec![
            ".teamcity",
            ".teamcity/logs",
            ".teamcity/properties",
            "docs",
            "docs/api",
            "symbols",
        ]
    );
    assert!(artifact_requests(&server).await.is_empty());
}

#[tokio::test]
async fn prompted_credentials_download_hidden_artifacts() {
    let server = MockServer::start().await;
    let root = download_root("", "Product_Release", "lastFinished");
    mount_build(&server, &root, RELEASE_BUILD).await;

    let out = TempDir::new().unwrap();
    let config = SyncConfig {
        url: server.uri(),
        build_type: "Product_Release".into(),
        glob: ".teamcity*".into(),
        include_hidden: true,
        ..Default::default()
    };
    let prompt = StaticPrompt::new(["operator", "hunter2"]);
    let downloader = ArtifactDownloader::new(config, out.path()).unwrap();
    let report = downloader.run(&prompt, &mut std::io::sink()).await.unwrap();

    assert_eq!(
        prompt.asked(),
        vec![CredentialField::Username, CredentialField::Password]
    );
    assert_eq!(report.summary().unwrap().downloaded(), 2);
    assert_eq!(
        files_under(out.path()),
        vec![
            ".teamcity/logs/buildLog.msg5",
            ".teamcity/properties/build.start.properties.gz",
        ]
    );
    assert_file(out.path(), ".teamcity/logs/buildLog.msg5", "log");

    let expected = format!("Basic {}", STANDARD.encode("operator:hunter2"));
    for request in server.received_requests().await.unwrap() {
        assert_eq!(
            request.headers.get("authorization").unwrap().to_str().unwrap(),
            expected
        );
    }
}

#[tokio::test]
async fn cancelled_prompt_leaves_server_and_disk_untouched() {
    let server = MockServer::start().await;

    let out = TempDir::new().unwrap();
    let config = SyncConfig {
        url: server.uri(),
        build_type: "Product_Release".into(),
        ..Default::default()
    };
    let downloader = ArtifactDownloader::new(config, out.path()).unwrap();
    let report = downloader.run(&NoPrompt, &mut std::io::sink()).await.unwrap();

    assert_eq!(report, SyncReport::Cancelled);
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(files_under(out.path()).is_empty());
}
