use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use hydrate_engine::{CacheConfig, ContactSource, Hydrator, Lazy, SourceContainer, SourceReader, entity_schema};
use hydrate_types::{Collection, FieldDescriptor, SourceKind};
use serde_json::json;
use uuid::Uuid;

/// Contact source that mints a new id on every fetch and counts fetches.
#[derive(Debug, Default)]
struct VolatileContactSource {
    fetches: Arc<AtomicUsize>,
}

impl SourceReader for VolatileContactSource {
    fn fetch_collection(&self) -> anyhow::Result<Collection> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let mut collection = Collection::new();
        collection.insert("Email".into(), json!("myname@domain.com"));
        collection.insert("Id".into(), json!(Uuid::new_v4()));
        Ok(collection)
    }
}

#[derive(Debug, Default)]
struct User {
    user_name: Option<Lazy<String>>,
    key: Option<Lazy<Uuid>>,
    user_business_field: Option<Lazy<String>>,
    nickname: Option<String>,
}

entity_schema! {
    User {
        user_name: String => FieldDescriptor::contact("Email"),
        key: Uuid => FieldDescriptor::contact("Id"),
        user_business_field: String => FieldDescriptor::business("InterestingBusinessField"),
    }
}

fn read_user(user: &User) -> (String, Uuid, String) {
    (
        user.user_name.as_ref().expect("user_name bound").value().expect("user_name"),
        user.key.as_ref().expect("key bound").value().expect("key"),
        user.user_business_field
            .as_ref()
            .expect("business field bound")
            .value()
            .expect("business field"),
    )
}

fn volatile_hydrator(fetches: &Arc<AtomicUsize>) -> Hydrator {
    let mut container = SourceContainer::with_defaults();
    container.register(
        SourceKind::Contact,
        VolatileContactSource {
            fetches: Arc::clone(fetches),
        },
    );
    Hydrator::with_config(container, &CacheConfig::default()).expect("hydrator")
}

#[test]
fn contact_fields_refresh_only_after_the_ttl() {
    let fetches = Arc::new(AtomicUsize::new(0));
    let hydrator = volatile_hydrator(&fetches);

    let first = hydrator.hydrate::<User>().expect("first hydration");
    let (user_name, first_id, business) = read_user(&first);
    assert_eq!(user_name, "myname@domain.com");
    assert_eq!(business, "Interesting Business Fact");
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert!(first.nickname.is_none());

    let second = hydrator.hydrate::<User>().expect("second hydration");
    let (_, second_id, _) = read_user(&second);
    assert_eq!(fetches.load(Ordering::SeqCst), 1, "second read within the TTL is a cache hit");
    assert_eq!(second_id, first_id);

    thread::sleep(Duration::from_secs(3));

    let third = hydrator.hydrate::<User>().expect("third hydration");
    let (user_name, third_id, _) = read_user(&third);
    assert_eq!(user_name, "myname@domain.com");
    assert_eq!(fetches.load(Ordering::SeqCst), 2, "expired collection is fetched again");
    assert_ne!(third_id, first_id);

    let fourth = hydrator.hydrate::<User>().expect("fourth hydration");
    let (_, fourth_id, _) = read_user(&fourth);
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
    assert_eq!(fourth_id, third_id);
}

#[test]
fn deterministic_source_keeps_its_id_across_refreshes() {
    let contact = ContactSource::new();
    let expected_id = contact.id();
    let container = SourceContainer::with_defaults().with_source(SourceKind::Contact, contact);
    let config = CacheConfig::new()
        .with_ttl(Duration::from_millis(40))
        .with_sweep_interval(Duration::from_millis(10));
    let hydrator = Hydrator::with_config(container, &config).expect("hydrator");

    let (_, first_id, _) = read_user(&hydrator.hydrate::<User>().expect("hydrate"));
    thread::sleep(Duration::from_millis(150));
    assert!(hydrator.cache().is_empty(), "sweeper evicted the expired collections");

    let (_, second_id, _) = read_user(&hydrator.hydrate::<User>().expect("hydrate"));
    assert_eq!(first_id, expected_id);
    assert_eq!(second_id, expected_id);
}

#[test]
fn concurrent_readers_share_one_collection() {
    let fetches = Arc::new(AtomicUsize::new(0));
    let hydrator = Arc::new(volatile_hydrator(&fetches));
    let threads = 6;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let hydrator = Arc::clone(&hydrator);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let user = hydrator.hydrate::<User>().expect("hydrate");
                barrier.wait();
                read_user(&user).1
            })
        })
        .collect();

    let ids: Vec<Uuid> = handles.into_iter().map(|handle| handle.join().expect("reader thread")).collect();
    let observed = fetches.load(Ordering::SeqCst);
    assert!((1..=threads).contains(&observed), "racing misses may fetch redundantly, got {}", observed);

    let settled = read_user(&hydrator.hydrate::<User>().expect("hydrate")).1;
    assert!(ids.iter().all(|id| *id == settled), "every racer received the canonical collection");
    assert_eq!(fetches.load(Ordering::SeqCst), observed);
}
