use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use httpmock::prelude::*;
use mailrisk_lib::config::ReputationSettings;
use mailrisk_lib::dns::{DnsError, DnsLookup, MxRecord};
use mailrisk_lib::lists::{self, DataFile, ListMatch};
use mailrisk_lib::{
    ApiKeyPool, Category, Classifier, DnsEvidenceResolver, ErrorLog, ReputationClient,
    RetryPolicy,
};
use serde_json::json;

/// Every domain has one MX host and no DMARC record.
struct OpenMailDns;

#[async_trait]
impl DnsLookup for OpenMailDns {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        Ok(vec![MxRecord::new(10, format!("mx.{domain}"))])
    }

    async fn lookup_txt(&self, _name: &str) -> Result<Vec<String>, DnsError> {
        Ok(Vec::new())
    }

    async fn resolve_ip(&self, _host: &str) -> Result<Option<IpAddr>, DnsError> {
        Ok(Some(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 25))))
    }
}

fn write(dir: &Path, file: DataFile, content: &str) {
    std::fs::write(dir.join(file.file_name()), content).unwrap();
}

fn seed(dir: &Path) {
    write(dir, DataFile::Disposable, "# Disposable\n## Mailinator\nmailinator.com\n");
    write(dir, DataFile::Privacy, "## Proton\nproton.me\n");
    write(dir, DataFile::Free, "gmail\nproton.me\n");
    write(dir, DataFile::University, "# Universidad de Mendoza\num.edu.ar\n");
    write(dir, DataFile::NewlyAdded, "# Newly discovered\n");
    write(dir, DataFile::ApiKeys, "# keys\nk1\n");
}

#[tokio::test]
async fn discoveries_survive_a_reload() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());

    let server = MockServer::start_async().await;
    let api = server
        .mock_async(|when, then| {
            when.method(GET).path("/tempbox.io").query_param("key", "k1");
            then.status(200).json_body(json!({
                "disposable": true,
                "privacy": false,
                "email_provider": "TempBox",
                "related_domains": ["tempbox.net"]
            }));
        })
        .await;

    let loaded = lists::load(dir.path()).await.unwrap();
    assert_eq!(loaded.api_keys, vec!["k1"]);
    assert!(loaded.store.file_status().api_keys);
    let store = Arc::new(loaded.store);
    let log = ErrorLog::new(store.files().error_log());

    let evidence = DnsEvidenceResolver::with_lookup(
        OpenMailDns,
        RetryPolicy::new(0, Duration::from_secs(1), Duration::from_millis(1)),
        log.clone(),
    );
    let reputation = ReputationClient::new(
        &ReputationSettings {
            base_url: server.base_url(),
            ..ReputationSettings::default()
        },
        ApiKeyPool::new(loaded.api_keys),
        log.clone(),
    )
    .unwrap();
    let classifier = Classifier::new(store, evidence, reputation, log);

    let listed = classifier.classify("someone@mailinator.com").await;
    assert_eq!(listed.category, Category::Disposable);
    assert_eq!(listed.source.as_deref(), Some("Mailinator"));
    assert!(!listed.api_checked);

    let found = classifier.classify("someone@tempbox.io").await;
    assert_eq!(found.category, Category::Disposable);
    assert_eq!(found.source.as_deref(), Some("TempBox"));
    assert!(found.api_checked);
    assert_eq!(found.mx.records[0].hostname, "mx.tempbox.io");

    // Served from memory now, no second API call.
    let again = classifier.classify("other@tempbox.io").await;
    assert_eq!(again.category, Category::Disposable);
    assert_eq!(api.hits_async().await, 1);

    let reloaded = lists::load(dir.path()).await.unwrap().store;
    assert_eq!(
        reloaded.classify_against_lists("tempbox.io", "tempbox"),
        ListMatch::NewlyAdded
    );
    assert_eq!(
        reloaded.classify_against_lists("tempbox.net", "tempbox"),
        ListMatch::Disposable {
            source: "TempBox".into()
        }
    );
    assert_eq!(
        reloaded.classify_against_lists("mailinator.com", "mailinator"),
        ListMatch::Disposable {
            source: "Mailinator".into()
        }
    );
}

#[tokio::test]
async fn unreachable_api_degrades_to_weak_security() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());

    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let loaded = lists::load(dir.path()).await.unwrap();
    let store = Arc::new(loaded.store);
    let log = ErrorLog::new(store.files().error_log());
    let classifier = Classifier::new(
        store,
        DnsEvidenceResolver::with_lookup(
            OpenMailDns,
            RetryPolicy::new(0, Duration::from_secs(1), Duration::from_millis(1)),
            log.clone(),
        ),
        ReputationClient::new(
            &ReputationSettings {
                base_url: format!("http://127.0.0.1:{port}"),
                timeout_ms: 500,
                ..ReputationSettings::default()
            },
            ApiKeyPool::new(loaded.api_keys),
            log.clone(),
        )
        .unwrap(),
        log,
    );

    let verdict = classifier.classify("ceo@smallcorp.example").await;
    assert_eq!(verdict.category, Category::WeakSecurity);
    assert!(verdict.api_checked);

    let error_log =
        std::fs::read_to_string(dir.path().join(lists::ERROR_LOG_FILE)).unwrap();
    assert!(error_log.starts_with("# Error log"));
    assert!(error_log.contains("VerifyMail API error for domain smallcorp.example"));
}

#[tokio::test]
async fn empty_data_dir_is_bootstrapped() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("data");

    let first = lists::load(&dir).await.unwrap();
    let status = first.store.file_status();
    assert!(!status.disposable && !status.privacy && !status.free);
    assert!(!status.university && !status.newly_added && !status.api_keys);
    assert!(first.api_keys.is_empty());
    assert_eq!(first.store.counts().disposable, 0);
    assert!(dir.join(lists::ERROR_LOG_FILE).exists());

    let second = lists::load(&dir).await.unwrap();
    let status = second.store.file_status();
    assert!(status.disposable && status.free && status.newly_added);
    // The key placeholder never becomes a key.
    assert!(!status.api_keys);
    assert!(second.api_keys.is_empty());
    assert!(second.store.counts().free > 0);
}
