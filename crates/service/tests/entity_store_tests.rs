use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use models::{AppRegistration, UserAccount, UserProfile};
use service::data::HerdDataProvider;
use service::storage::{EntityStore, JsonFileBackend, KeyBuilder, KeyValueBackend, MemoryBackend};

fn memory_store() -> (EntityStore, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    (EntityStore::new(backend.clone(), KeyBuilder::default()), backend)
}

#[test]
fn create_then_get_by_id_and_instance() -> anyhow::Result<()> {
    let (store, _) = memory_store();
    let created = store.create_app_registration(AppRegistration::for_instance("mastodon.social"))?;
    assert_eq!(created.id, 1);

    assert_eq!(store.get_app_registration(1)?, Some(created.clone()));
    assert_eq!(store.get_app_registration_by_instance("mastodon.social")?, Some(created));
    Ok(())
}

#[test]
fn sequential_creates_get_consecutive_ids() -> anyhow::Result<()> {
    let (store, _) = memory_store();
    let a = store.create_app_registration(AppRegistration::for_instance("a"))?;
    let b = store.create_app_registration(AppRegistration::for_instance("b"))?;
    assert_eq!((a.id, b.id), (1, 2));
    Ok(())
}

#[test]
fn update_replaces_searchable_fields() -> anyhow::Result<()> {
    let (store, _) = memory_store();
    let mut reg = store.create_app_registration(AppRegistration::for_instance("mastodon.social"))?;
    reg.instance = "mastodon.social.new".into();
    store.update_app_registration(&reg)?;

    assert_eq!(store.get_app_registration(1)?.unwrap().instance, "mastodon.social.new");
    assert!(store.get_app_registration_by_instance("mastodon.social")?.is_none());
    assert_eq!(store.get_app_registration_by_instance("mastodon.social.new")?.map(|r| r.id), Some(1));
    Ok(())
}

#[test]
fn unknown_id_is_absent() -> anyhow::Result<()> {
    let (store, _) = memory_store();
    store.create_app_registration(AppRegistration::for_instance("a"))?;
    store.create_app_registration(AppRegistration::for_instance("b"))?;
    assert!(store.get_app_registration(999)?.is_none());
    assert!(store.get_app_registration(0)?.is_none());
    Ok(())
}

#[test]
fn entity_types_are_isolated() -> anyhow::Result<()> {
    let (store, _) = memory_store();
    let reg = store.create_app_registration(AppRegistration::for_instance("a"))?;
    let user = store.create_user(UserAccount { email: "a@b.c".into(), ..Default::default() })?;
    assert_eq!(reg.id, 1);
    assert_eq!(user.id, 1);

    assert!(store.get_user_by_email("a@b.c")?.is_some());
    assert!(store.get_app_registration_by_instance("a@b.c")?.is_none());
    assert_eq!(store.list_all::<AppRegistration>()?.len(), 1);
    assert_eq!(store.list_all::<UserAccount>()?.len(), 1);
    assert!(store.list_all::<UserProfile>()?.is_empty());
    Ok(())
}

#[test]
fn update_is_idempotent() -> anyhow::Result<()> {
    let (store, _) = memory_store();
    let mut profile = store.create_profile(UserProfile { user_id: 3, ..Default::default() })?;
    profile.first_name = "Ada".into();
    store.update_profile(&profile)?;
    let after_first = store.get_profile(profile.id)?;
    store.update_profile(&profile)?;
    assert_eq!(store.get_profile(profile.id)?, after_first);
    assert_eq!(after_first, Some(profile));
    Ok(())
}

#[test]
fn enumeration_never_yields_the_counter() -> anyhow::Result<()> {
    let (store, backend) = memory_store();
    for i in 0..3 {
        store.create_user(UserAccount { email: format!("u{i}@e.com"), ..Default::default() })?;
    }
    assert!(backend.read_key("Herd/UserAccount/NextID").is_ok());
    let all = store.list_all::<UserAccount>()?;
    assert_eq!(all.iter().map(|u| u.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(store.find::<UserAccount, _>(|u| u.id == 4)?.is_none());
    Ok(())
}

#[test]
fn find_returns_first_in_key_order() -> anyhow::Result<()> {
    let (store, _) = memory_store();
    store.create_app_registration(AppRegistration::for_instance("dup"))?;
    store.create_app_registration(AppRegistration::for_instance("dup"))?;
    assert_eq!(store.get_app_registration_by_instance("dup")?.map(|r| r.id), Some(1));
    Ok(())
}

#[test]
fn concurrent_creates_get_distinct_contiguous_ids() -> anyhow::Result<()> {
    let (store, _) = memory_store();
    store.create_app_registration(AppRegistration::for_instance("seed"))?;

    let handles: Vec<_> = (0..16)
        .map(|t| {
            let store = store.clone();
            thread::spawn(move || {
                (0..8)
                    .map(|i| {
                        store
                            .create_app_registration(AppRegistration::for_instance(format!("t{t}-{i}")))
                            .map(|r| r.id)
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        for id in handle.join().expect("creator thread panicked")? {
            assert!(ids.insert(id), "id {id} issued twice");
        }
    }
    assert_eq!(ids, (2..=129).collect::<HashSet<_>>());
    assert_eq!(store.list_all::<AppRegistration>()?.len(), 129);
    Ok(())
}

#[test]
fn concurrent_creates_across_types_keep_separate_sequences() -> anyhow::Result<()> {
    let (store, _) = memory_store();
    let regs = {
        let store = store.clone();
        thread::spawn(move || {
            (0..20)
                .map(|_| store.create_app_registration(AppRegistration::default()).map(|r| r.id))
                .collect::<Result<Vec<_>, _>>()
        })
    };
    let users = {
        let store = store.clone();
        thread::spawn(move || {
            (0..20)
                .map(|_| store.create_user(UserAccount::default()).map(|u| u.id))
                .collect::<Result<Vec<_>, _>>()
        })
    };
    let regs = regs.join().expect("thread panicked")?;
    let users = users.join().expect("thread panicked")?;
    assert_eq!(regs, (1..=20).collect::<Vec<_>>());
    assert_eq!(users, (1..=20).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn file_backed_store_survives_reopen() -> anyhow::Result<()> {
    let dir = std::env::temp_dir().join(format!("herd_store_{}", uuid::Uuid::new_v4()));
    let path = dir.join("herd.json");

    {
        let store = EntityStore::new(Arc::new(JsonFileBackend::open(&path)?), KeyBuilder::default());
        store.create_app_registration(AppRegistration::for_instance("one"))?;
        store.create_app_registration(AppRegistration::for_instance("two"))?;
    }

    let store = EntityStore::new(Arc::new(JsonFileBackend::open(&path)?), KeyBuilder::default());
    assert_eq!(store.get_app_registration_by_instance("two")?.map(|r| r.id), Some(2));
    let three = store.create_app_registration(AppRegistration::for_instance("three"))?;
    assert_eq!(three.id, 3);

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}

#[test]
fn reads_records_written_by_other_implementations() -> anyhow::Result<()> {
    let (store, backend) = memory_store();
    backend.write_key("Herd/AppRegistration/NextID", "6")?;
    backend.write_key(
        "Herd/AppRegistration/5",
        r#"{
            "ClientId": "cid",
            "ClientSecret": "secret",
            "Instance": "mastodon.xyz",
            "MastodonAppRegistrationID": "42",
            "ID": 5
        }"#,
    )?;

    let reg = store.get_app_registration_by_instance("mastodon.xyz")?.unwrap();
    assert_eq!(reg.id, 5);
    assert_eq!(reg.client_secret, "secret");
    assert_eq!(store.create_app_registration(AppRegistration::default())?.id, 6);
    Ok(())
}

#[test]
fn reads_user_accounts_written_by_other_implementations() -> anyhow::Result<()> {
    let (store, backend) = memory_store();
    backend.write_key(
        "Herd/UserAccount/1",
        r#"{"Email":"a@b.c","Security":{"SaltKey":1283746,"SaltedPassword":"x"},"MastodonConnection":null,"ProfileID":1,"ID":1}"#,
    )?;

    let by_id = store.get_user(1)?.unwrap();
    assert_eq!(by_id.security.salt_key, 1283746);
    assert_eq!(by_id.profile_id, 1);
    assert_eq!(store.get_user_by_email("a@b.c")?, Some(by_id));
    Ok(())
}

#[test]
fn email_lookup_ignores_case_and_returns_first_match() -> anyhow::Result<()> {
    let (store, _) = memory_store();
    store.create_user(UserAccount { email: "Ada@Example.com".into(), ..Default::default() })?;
    store.create_user(UserAccount { email: "ada@example.com".into(), ..Default::default() })?;

    assert_eq!(store.get_user_by_email("ada@example.com")?.map(|u| u.id), Some(1));
    assert_eq!(store.get_user_by_email(" ADA@EXAMPLE.COM ")?.map(|u| u.id), Some(1));
    Ok(())
}
