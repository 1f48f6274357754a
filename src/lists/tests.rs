use std::collections::HashMap;
use std::sync::Arc;

use super::parse::{SectionMarker, has_section_header, parse_sections};
use super::{
    DataFile, DomainListStore, ListMatch, ListTables, RecordOutcome, StoreError, load,
};

fn lines_of(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

fn fixture_tables() -> ListTables {
    let mut tables = ListTables::default();
    tables
        .disposable
        .insert("mailinator.com".into(), "Mailinator".into());
    tables
        .privacy
        .insert("proton.me".into(), "Proton".into());
    tables.free.insert("proton.me".into());
    tables.free.insert("gmail".into());
    tables
        .university
        .insert("um.edu.ar".into(), "Universidad de Mendoza".into());
    tables
}

#[test]
fn two_source_sections_keep_their_labels() {
    let content = "# Disposable email domains\n\
                   ## Mailinator\n\
                   mailinator.com\n\
                   MailInator.NET \n\
                   \n\
                   ## Guerrilla Mail\n\
                   # a comment\n\
                   guerrillamail.com\n";
    let parsed = parse_sections(content, SectionMarker::DoubleHash);
    let map: HashMap<_, _> = parsed.entries.into_iter().collect();

    assert_eq!(map.len(), 3);
    assert_eq!(map["mailinator.com"], "Mailinator");
    assert_eq!(map["mailinator.net"], "Mailinator");
    assert_eq!(map["guerrillamail.com"], "Guerrilla Mail");
}

#[test]
fn entries_before_first_header_are_dropped() {
    let parsed = parse_sections("orphan.com\n## Source\nkept.com\nnot a domain\n", SectionMarker::DoubleHash);
    assert_eq!(parsed.entries, vec![("kept.com".to_string(), "Source".to_string())]);
    assert_eq!(parsed.skipped, 1);
}

#[test]
fn university_headers_use_single_hash() {
    let content = "# University email domains\n\
                   # Universidad de Mendoza\n\
                   um.edu.ar\n\
                   ## Odd Header\n\
                   odd.edu\n";
    let parsed = parse_sections(content, SectionMarker::SingleHash);
    let map: HashMap<_, _> = parsed.entries.into_iter().collect();
    assert_eq!(map["um.edu.ar"], "Universidad de Mendoza");
    assert_eq!(map["odd.edu"], "# Odd Header");
}

#[test]
fn section_header_match_is_exact() {
    let content = "## Foo Mail\nfoo.com\n## Foobar\n";
    assert!(has_section_header(content, "Foo Mail"));
    assert!(has_section_header(content, "Foobar"));
    assert!(!has_section_header(content, "Foo"));
}

#[test]
fn precedence_follows_list_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut tables = fixture_tables();
    tables.privacy.insert("mailinator.com".into(), "Shadowed".into());
    tables.newly_added.insert("fresh-temp.com".into());
    let store = DomainListStore::new(tables, dir.path());

    assert_eq!(
        store.classify_against_lists("mailinator.com", "mailinator"),
        ListMatch::Disposable {
            source: "Mailinator".into()
        }
    );
    assert_eq!(
        store.classify_against_lists("fresh-temp.com", "fresh-temp"),
        ListMatch::NewlyAdded
    );
    assert_eq!(
        store.classify_against_lists("proton.me", "proton"),
        ListMatch::Privacy {
            source: "Proton".into()
        }
    );
    assert_eq!(
        store.classify_against_lists("um.edu.ar", "um.edu"),
        ListMatch::University {
            name: "Universidad de Mendoza".into()
        }
    );
    assert_eq!(store.classify_against_lists("gmail.com", "gmail"), ListMatch::Free);
    assert_eq!(store.classify_against_lists("example.com", "example"), ListMatch::None);
}

#[tokio::test]
async fn load_reads_existing_files_and_creates_missing_ones() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    std::fs::create_dir(&data).unwrap();
    std::fs::write(
        data.join("disposable.txt"),
        "## Mailinator\nmailinator.com\n## Yopmail\nyopmail.com\n",
    )
    .unwrap();
    std::fs::write(data.join("free_provider.txt"), "# free\nGmail\nmail.com\n").unwrap();
    std::fs::write(data.join("verifymail_api.txt"), "# keys\nkey-one\nYOUR_API_KEY_HERE\nKey-Two\n").unwrap();

    let loaded = load(&data).await.unwrap();
    let status = loaded.store.file_status();

    assert!(status.disposable);
    assert!(status.free);
    assert!(status.api_keys);
    assert!(!status.privacy);
    assert!(!status.university);
    assert!(!status.newly_added);
    assert_eq!(loaded.api_keys, vec!["key-one".to_string(), "Key-Two".to_string()]);

    let counts = loaded.store.counts();
    assert_eq!(counts.disposable, 2);
    assert_eq!(counts.free, 2);
    // placeholders are written but not loaded
    assert_eq!(counts.privacy, 0);
    assert_eq!(counts.university, 0);
    assert!(data.join("privacy.txt").exists());
    assert!(data.join("universities.txt").exists());
    assert!(data.join("newlyadded.txt").exists());
    assert!(data.join("error.log").exists());

    assert_eq!(
        loaded.store.classify_against_lists("yopmail.com", "yopmail"),
        ListMatch::Disposable {
            source: "Yopmail".into()
        }
    );
    assert_eq!(loaded.store.classify_against_lists("gmail.com", "gmail"), ListMatch::Free);
}

#[tokio::test]
async fn synthesized_files_load_on_next_start() {
    let dir = tempfile::tempdir().unwrap();
    let first = load(dir.path()).await.unwrap();
    assert!(first.api_keys.is_empty());
    assert!(!first.store.file_status().api_keys);

    let second = load(dir.path()).await.unwrap();
    let status = second.store.file_status();
    assert!(status.disposable && status.privacy && status.free && status.university);
    assert!(second.api_keys.is_empty(), "placeholder key must not be loaded");
    assert_eq!(
        second
            .store
            .classify_against_lists("example.disposable.com", "example.disposable"),
        ListMatch::Disposable {
            source: "example.com".into()
        }
    );
}

#[tokio::test]
async fn record_new_disposable_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = DomainListStore::new(fixture_tables(), dir.path());

    let first = store.record_new_disposable("Temp-Box.dev", "VerifyMail API").await.unwrap();
    let second = store.record_new_disposable("temp-box.dev", "VerifyMail API").await.unwrap();

    assert_eq!(first, RecordOutcome::Recorded);
    assert_eq!(second, RecordOutcome::AlreadyKnown);
    assert_eq!(store.counts().newly_added, 1);
    assert_eq!(lines_of(&store.files().path(DataFile::NewlyAdded)), vec!["temp-box.dev"]);
    assert_eq!(
        store.classify_against_lists("temp-box.dev", "temp-box"),
        ListMatch::NewlyAdded
    );
}

#[tokio::test]
async fn record_skips_domains_already_in_disposable_list() {
    let dir = tempfile::tempdir().unwrap();
    let store = DomainListStore::new(fixture_tables(), dir.path());
    let outcome = store.record_new_disposable("mailinator.com", "x").await.unwrap();
    assert_eq!(outcome, RecordOutcome::AlreadyKnown);
    assert!(!store.files().path(DataFile::NewlyAdded).exists());
}

#[tokio::test]
async fn record_rejects_invalid_domain() {
    let dir = tempfile::tempdir().unwrap();
    let store = DomainListStore::new(ListTables::default(), dir.path());
    let err = store.record_new_disposable("not_a_domain", "x").await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput { .. }));
    assert_eq!(store.counts().newly_added, 0);
}

#[tokio::test]
async fn failed_append_keeps_memory_authoritative() {
    let dir = tempfile::tempdir().unwrap();
    let store = DomainListStore::new(ListTables::default(), dir.path().join("missing-dir"));

    let err = store.record_new_disposable("temp-box.dev", "x").await.unwrap_err();
    assert!(matches!(err, StoreError::Persist { .. }));
    assert!(store.is_known_disposable("temp-box.dev"));

    let again = store.record_new_disposable("temp-box.dev", "x").await.unwrap();
    assert_eq!(again, RecordOutcome::AlreadyKnown);
}

#[tokio::test]
async fn concurrent_discoveries_write_one_line() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(DomainListStore::new(ListTables::default(), dir.path()));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.record_new_disposable("race.dev", "x").await })
        })
        .collect();
    let mut recorded = 0;
    for task in tasks {
        if task.await.unwrap().unwrap() == RecordOutcome::Recorded {
            recorded += 1;
        }
    }
    assert_eq!(recorded, 1);
    assert_eq!(lines_of(&store.files().path(DataFile::NewlyAdded)), vec!["race.dev"]);
}

#[tokio::test]
async fn related_domains_open_a_new_provider_section() {
    let dir = tempfile::tempdir().unwrap();
    let disposable = dir.path().join("disposable.txt");
    std::fs::write(&disposable, "## Mailinator\nmailinator.com\n").unwrap();
    let store = DomainListStore::new(fixture_tables(), dir.path());

    let related = vec!["tmpbox.net".to_string(), "Tmpbox.ORG".to_string(), "bad domain".to_string()];
    let outcome = store.ingest_related(&related, Some("TmpBox")).await.unwrap();

    assert!(outcome.section_created);
    assert_eq!(outcome.recorded, 2);
    assert_eq!(outcome.skipped_invalid, 1);
    let content = std::fs::read_to_string(&disposable).unwrap();
    assert!(content.ends_with("\n## TmpBox\ntmpbox.net\ntmpbox.org\n"), "{content}");
    assert_eq!(
        store.classify_against_lists("tmpbox.org", "tmpbox"),
        ListMatch::Disposable {
            source: "TmpBox".into()
        }
    );
    assert_eq!(store.counts().newly_added, 0);
}

#[tokio::test]
async fn related_domains_for_existing_section_go_to_newly_added() {
    let dir = tempfile::tempdir().unwrap();
    let disposable = dir.path().join("disposable.txt");
    let original = "## Mailinator\nmailinator.com\n";
    std::fs::write(&disposable, original).unwrap();
    let store = DomainListStore::new(fixture_tables(), dir.path());

    let related = vec!["mailinator2.com".to_string(), "mailinator.com".to_string()];
    let outcome = store.ingest_related(&related, Some("Mailinator")).await.unwrap();

    assert!(!outcome.section_created);
    assert_eq!(outcome.recorded, 1);
    assert_eq!(std::fs::read_to_string(&disposable).unwrap(), original);
    assert_eq!(
        lines_of(&store.files().path(DataFile::NewlyAdded)),
        vec!["mailinator2.com"]
    );
}

#[tokio::test]
async fn related_domains_without_provider_go_to_newly_added() {
    let dir = tempfile::tempdir().unwrap();
    let store = DomainListStore::new(ListTables::default(), dir.path());
    let related = vec!["a-temp.com".to_string(), "b-temp.com".to_string()];
    let outcome = store.ingest_related(&related, None).await.unwrap();

    assert!(!outcome.section_created);
    assert_eq!(outcome.recorded, 2);
    assert_eq!(store.counts().newly_added, 2);
    assert!(!dir.path().join("disposable.txt").exists());
}

#[tokio::test]
async fn provider_with_control_characters_cannot_inject_lines() {
    let dir = tempfile::tempdir().unwrap();
    let disposable = dir.path().join("disposable.txt");
    let original = "## Mailinator\nmailinator.com\n";
    std::fs::write(&disposable, original).unwrap();
    let store = DomainListStore::new(ListTables::default(), dir.path());

    let related = vec!["tmp.net".to_string()];
    let outcome = store
        .ingest_related(&related, Some("Evil\ngmail.com"))
        .await
        .unwrap();

    assert!(!outcome.section_created);
    assert_eq!(outcome.recorded, 1);
    assert_eq!(std::fs::read_to_string(&disposable).unwrap(), original);
    assert_eq!(lines_of(&store.files().path(DataFile::NewlyAdded)), vec!["tmp.net"]);

    let reloaded = load(dir.path()).await.unwrap().store;
    assert!(!reloaded.classify_against_lists("gmail.com", "gmail").is_disposable());
    assert_eq!(
        reloaded.classify_against_lists("tmp.net", "tmp"),
        ListMatch::NewlyAdded
    );
}

#[tokio::test]
async fn invalid_utf8_in_list_does_not_abort_load() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("disposable.txt"),
        b"## Source\nvalid.com\n\xff\xfe-junk.com\nother.com\n",
    )
    .unwrap();

    let loaded = load(dir.path()).await.unwrap();
    let store = loaded.store;
    assert!(store.file_status().disposable);
    assert_eq!(store.counts().disposable, 2);
    assert_eq!(
        store.classify_against_lists("other.com", "other"),
        ListMatch::Disposable {
            source: "Source".into()
        }
    );
}
