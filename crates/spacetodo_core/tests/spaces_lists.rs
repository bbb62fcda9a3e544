use spacetodo_core::db::open_db_in_memory;
use spacetodo_core::{SpaceService, SpaceServiceError, SqliteSpaceRepository, ValidationError};

#[test]
fn create_space_validates_slug_and_name() {
    let conn = open_db_in_memory().unwrap();
    let service = SpaceService::new(SqliteSpaceRepository::try_new(&conn).unwrap());

    let space = service.create_space(" family-home ", " Family Home ").unwrap();
    assert_eq!(space.slug, "family-home");
    assert_eq!(space.name, "Family Home");

    let err = service.create_space("Family Home", "x").unwrap_err();
    assert!(matches!(
        err,
        SpaceServiceError::Invalid(ValidationError::InvalidSlug(_))
    ));

    let err = service.create_space("ok", "  ").unwrap_err();
    assert!(matches!(
        err,
        SpaceServiceError::Invalid(ValidationError::MissingField("name"))
    ));
}

#[test]
fn duplicate_slug_is_reported() {
    let conn = open_db_in_memory().unwrap();
    let service = SpaceService::new(SqliteSpaceRepository::try_new(&conn).unwrap());

    service.create_space("home", "Home").unwrap();
    let err = service.create_space("home", "Another").unwrap_err();

    assert!(matches!(err, SpaceServiceError::SlugTaken(slug) if slug == "home"));
}

#[test]
fn space_cards_are_sorted_by_name_with_list_counts() {
    let conn = open_db_in_memory().unwrap();
    let service = SpaceService::new(SqliteSpaceRepository::try_new(&conn).unwrap());

    let work = service.create_space("work", "Work").unwrap();
    let home = service.create_space("home", "Home").unwrap();
    service.create_list(&work.id, "u1", "Sprint", false).unwrap();
    service.create_list(&work.id, "u1", "Backlog", true).unwrap();

    let cards = service.list_space_cards().unwrap();
    let summary = cards
        .iter()
        .map(|card| (card.space.slug.as_str(), card.list_count))
        .collect::<Vec<_>>();
    assert_eq!(summary, vec![("home", 0), ("work", 2)]);
    assert_eq!(service.count_lists(&home.id).unwrap(), 0);

    let json = serde_json::to_value(&cards[1]).unwrap();
    assert_eq!(json["slug"], "work");
    assert_eq!(json["list_count"], 2);
}

#[test]
fn create_list_requires_existing_space_and_title() {
    let conn = open_db_in_memory().unwrap();
    let service = SpaceService::new(SqliteSpaceRepository::try_new(&conn).unwrap());
    let space = service.create_space("home", "Home").unwrap();

    let err = service
        .create_list("missing", "u1", "Groceries", false)
        .unwrap_err();
    assert!(matches!(err, SpaceServiceError::SpaceNotFound(_)));

    let err = service.create_list(&space.id, "u1", " ", false).unwrap_err();
    assert!(matches!(
        err,
        SpaceServiceError::Invalid(ValidationError::MissingField("title"))
    ));

    let list = service
        .create_list(&space.id, "u1", " Groceries ", true)
        .unwrap();
    assert_eq!(list.title, "Groceries");
    assert!(list.private);
    assert_eq!(service.get_list(&list.id).unwrap(), Some(list));
}

#[test]
fn private_lists_are_hidden_from_other_members() {
    let conn = open_db_in_memory().unwrap();
    let service = SpaceService::new(SqliteSpaceRepository::try_new(&conn).unwrap());
    let space = service.create_space("home", "Home").unwrap();

    let shared = service.create_list(&space.id, "alice", "Shared", false).unwrap();
    let secret = service.create_list(&space.id, "alice", "Secret", true).unwrap();

    let for_alice = service.list_lists("home", "alice").unwrap();
    let alice_ids = for_alice.iter().map(|list| list.id.as_str()).collect::<Vec<_>>();
    assert_eq!(alice_ids, vec![secret.id.as_str(), shared.id.as_str()]);

    let for_bob = service.list_lists("home", "bob").unwrap();
    assert_eq!(for_bob, vec![shared]);

    let err = service.list_lists("nowhere", "bob").unwrap_err();
    assert!(matches!(err, SpaceServiceError::SpaceNotFound(key) if key == "nowhere"));
}
