//! A mock TeamCity artifact server and manifest builders

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A realistic release build: installers, nested docs, and the hidden
/// metadata TeamCity publishes alongside every build
pub const RELEASE_BUILD: &[(&str, &str, &str)] = &[
    ("setup", "msi", "installer bytes"),
    ("setup", "exe", "bootstrapper bytes"),
    ("docs/manual", "pdf", "manual"),
    ("docs/api/index", "html", "<html></html>"),
    ("symbols/app", "pdb", "symbols"),
    (".teamcity/properties/build.start.properties", "gz", "props"),
    (".teamcity/logs/buildLog", "msg5", "log"),
];

/// Render an Ivy manifest listing every (name, ext) of `artifacts`
pub fn ivy_manifest<'a>(artifacts: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <ivy-module version=\"1.3\">\n  \
         <info organisation=\"acme\" module=\"Product_Release\" revision=\"1.4.2\"/>\n  \
         <configurations><conf name=\"default\"/></configurations>\n  \
         <publications>\n",
    );
    for (name, ext) in artifacts {
        xml.push_str(&format!(
            "    <artifact name=\"{name}\" type=\"{ext}\" ext=\"{ext}\" conf=\"default\"/>\n"
        ));
    }
    xml.push_str("  </publications>\n</ivy-module>\n");
    xml
}

/// Where a build's artifacts are served below the server root
pub fn download_root(context: &str, build_type: &str, build_id: &str) -> String {
    format!("{context}/httpAuth/repository/download/{build_type}/{build_id}")
}

/// Mount `build` (manifest plus every file) below `root`.
///
/// The manifest must be fetched exactly once; each file at most once.
pub async fn mount_build(server: &MockServer, root: &str, build: &[(&str, &str, &str)]) {
    let manifest = ivy_manifest(build.iter().map(|(name, ext, _)| (*name, *ext)));
    Mock::given(method("GET"))
        .and(path(format!("{root}/teamcity-ivy.xml")))
        .respond_with(ResponseTemplate::new(200).set_body_string(manifest))
        .expect(1)
        .mount(server)
        .await;

    for (name, ext, body) in build {
        Mock::given(method("GET"))
            .and(path(format!("{root}/{name}.{ext}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(*body))
            .expect(0..=1)
            .mount(server)
            .await;
    }
}

/// Paths of artifact downloads the server has seen, manifest excluded
pub async fn artifact_requests(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|request| request.url.path().to_string())
        .filter(|p| !p.ends_with("/teamcity-ivy.xml"))
        .collect()
}
