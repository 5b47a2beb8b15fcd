mod helpers;

use hippocampus::db;
use hippocampus::db::migrations::{get_schema_version, CURRENT_SCHEMA_VERSION};
use hippocampus::memory::{EngramInput, EngramType, RecallMode};
use tempfile::TempDir;

#[test]
fn engrams_survive_a_restart() {
    let tmp = TempDir::new().unwrap();
    let before = {
        let memory = helpers::service(tmp.path());
        memory
            .remember(
                "dev",
                EngramInput::new("Redis default port is 6379", EngramType::Atomic)
                    .with_id("redis")
                    .with_schema("Redis\n  port [0.9]")
                    .with_strength(0.65),
            )
            .unwrap();
        memory.export("dev").unwrap()
    };

    let memory = helpers::service(tmp.path());
    let after = memory.recall("dev", Some("6379"), RecallMode::Balanced).unwrap();
    assert_eq!(after, before);

    // cues were reloaded with the record
    assert_eq!(
        memory.recall("dev", Some("port"), RecallMode::Focused).unwrap().len(),
        1
    );
}

#[test]
fn overwrite_is_persisted() {
    let tmp = TempDir::new().unwrap();
    {
        let memory = helpers::service(tmp.path());
        memory.remember("dev", helpers::atomic("k", "first version", 0.5)).unwrap();
        memory.remember("dev", helpers::atomic("k", "second version", 0.9)).unwrap();
    }

    let memory = helpers::service(tmp.path());
    let all = memory.export("dev").unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].content, "second version");
    assert!(memory
        .recall("dev", Some("first"), RecallMode::Balanced)
        .unwrap()
        .is_empty());
}

#[test]
fn each_role_gets_its_own_database_file() {
    let tmp = TempDir::new().unwrap();
    let memory = helpers::service(tmp.path());
    memory.remember("java-dev", helpers::atomic("a", "alpha", 0.5)).unwrap();
    memory.remember("writer", helpers::atomic("b", "beta", 0.5)).unwrap();

    for role in ["java-dev", "writer"] {
        let path = tmp.path().join(role).join(db::DB_FILE_NAME);
        assert!(path.is_file(), "{} missing", path.display());

        let conn = db::open_database(&path).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM engrams", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}

#[test]
fn unwritable_memory_dir_degrades_to_memory_only() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("not-a-dir");
    std::fs::write(&blocker, b"occupied").unwrap();

    let memory = helpers::service(&blocker);
    let id = memory
        .remember("dev", helpers::atomic("r", "Redis default port is 6379", 0.8))
        .unwrap();
    assert_eq!(id, "r");

    let found = memory.recall("dev", Some("redis"), RecallMode::Balanced).unwrap();
    assert_eq!(helpers::ids(&found), vec!["r"]);

    let stats = memory.stats("dev").unwrap();
    assert!(stats.degraded);
    assert_eq!(stats.total_engrams, 1);
    assert_eq!(stats.pending_writes, 1);
}

#[test]
fn writes_reach_disk_once_the_memory_dir_recovers() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("roles");
    std::fs::write(&dir, b"occupied").unwrap();

    let memory = helpers::service(&dir);
    memory.remember("dev", helpers::atomic("a", "written while blocked", 0.5)).unwrap();
    let stats = memory.stats("dev").unwrap();
    assert!(stats.degraded);
    assert_eq!(stats.pending_writes, 1);

    std::fs::remove_file(&dir).unwrap();
    std::fs::create_dir(&dir).unwrap();

    memory.remember("dev", helpers::atomic("b", "written after recovery", 0.5)).unwrap();
    let stats = memory.stats("dev").unwrap();
    assert!(!stats.degraded);
    assert_eq!(stats.pending_writes, 0);
    drop(memory);

    let reopened = helpers::service(&dir);
    let mut on_disk: Vec<String> = reopened
        .export("dev")
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();
    on_disk.sort();
    assert_eq!(on_disk, vec!["a", "b"]);
}

#[test]
fn reading_an_unknown_role_leaves_nothing_behind() {
    let tmp = TempDir::new().unwrap();
    let memory = helpers::service(tmp.path());

    assert!(memory.recall("typo-role", None, RecallMode::Balanced).unwrap().is_empty());
    assert!(memory.recall("typo-role", Some("redis"), RecallMode::Focused).unwrap().is_empty());
    assert_eq!(memory.stats("typo-role").unwrap().total_engrams, 0);
    assert!(memory.export("typo-role").unwrap().is_empty());

    assert!(!tmp.path().join("typo-role").exists());
    assert!(memory.roles().is_empty());

    memory.remember("typo-role", helpers::atomic("a", "now it exists", 0.5)).unwrap();
    assert!(tmp.path().join("typo-role").join(db::DB_FILE_NAME).is_file());
    assert_eq!(memory.roles(), vec!["typo-role"]);
}

#[test]
fn healthy_store_is_not_degraded() {
    let tmp = TempDir::new().unwrap();
    let memory = helpers::service(tmp.path());
    memory.remember("dev", helpers::atomic("a", "alpha", 0.5)).unwrap();
    memory.recall("dev", None, RecallMode::Balanced).unwrap();

    let stats = memory.stats("dev").unwrap();
    assert!(!stats.degraded);
    assert_eq!(stats.pending_writes, 0);
}

#[test]
fn access_history_persists_for_focused_ranking() {
    let tmp = TempDir::new().unwrap();
    {
        let memory = helpers::service(tmp.path());
        helpers::remember_all(
            &memory,
            "dev",
            &[("often", "redis cache", 0.5), ("rare", "redis queue", 0.5)],
        );
        memory.recall("dev", Some("cache"), RecallMode::Balanced).unwrap();
        memory.recall("dev", Some("cache"), RecallMode::Balanced).unwrap();
    }

    let memory = helpers::service(tmp.path());
    let focused = memory.recall("dev", Some("redis"), RecallMode::Focused).unwrap();
    assert_eq!(helpers::ids(&focused), vec!["often", "rare"]);
}

#[test]
fn export_then_import_into_another_role() {
    let tmp = TempDir::new().unwrap();
    let memory = helpers::service(tmp.path());
    helpers::remember_all(
        &memory,
        "source",
        &[("a", "alpha engram", 0.3), ("b", "beta engram", 0.9)],
    );

    let exported = memory.export("source").unwrap();
    assert_eq!(helpers::ids(&exported), vec!["b", "a"]);

    let outcome = memory.import("target", exported.clone());
    assert!(outcome.is_ok());
    assert_eq!(outcome.stored.len(), 2);

    // ids and timestamps are kept
    assert_eq!(memory.export("target").unwrap(), exported);
    let found = memory.recall("target", Some("beta"), RecallMode::Balanced).unwrap();
    assert_eq!(helpers::ids(&found), vec!["b"]);
}

#[test]
fn import_skips_invalid_engrams() {
    let tmp = TempDir::new().unwrap();
    let memory = helpers::service(tmp.path());
    memory.remember("source", helpers::atomic("ok", "fine", 0.5)).unwrap();

    let mut engrams = memory.export("source").unwrap();
    let mut bad = engrams[0].clone();
    bad.id = "bad".into();
    bad.strength = 3.0;
    engrams.push(bad);

    let outcome = memory.import("target", engrams);
    assert_eq!(outcome.stored, vec!["ok"]);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].0, 1);
    assert_eq!(memory.stats("target").unwrap().total_engrams, 1);
}

#[test]
fn roles_lists_open_and_on_disk_roles() {
    let tmp = TempDir::new().unwrap();
    {
        let memory = helpers::service(tmp.path());
        memory.remember("archived", helpers::atomic("a", "alpha", 0.5)).unwrap();
    }
    std::fs::create_dir_all(tmp.path().join("no-database")).unwrap();

    let memory = helpers::service(tmp.path());
    memory.remember("active", helpers::atomic("b", "beta", 0.5)).unwrap();

    assert_eq!(memory.roles(), vec!["active", "archived"]);
}
