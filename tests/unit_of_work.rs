use company_employees::entities::{company, employee};
use company_employees::storage::Storage;
use company_employees::PersistenceError;
use uuid::Uuid;

async fn storage() -> Storage {
    Storage::in_memory().await.expect("in-memory storage should open")
}

#[tokio::test]
async fn test_repositories_are_memoized_per_manager() {
    let storage = storage().await;
    let manager = storage.unit_of_work();

    assert!(std::ptr::eq(manager.employee(), manager.employee()));
    assert!(std::ptr::eq(manager.company(), manager.company()));

    let other = storage.unit_of_work();
    assert!(!std::ptr::eq(manager.employee(), other.employee()));
}

#[tokio::test]
async fn test_save_without_changes_is_noop() {
    let storage = storage().await;
    let manager = storage.unit_of_work();
    assert_eq!(manager.save().await.unwrap(), 0);
}

#[tokio::test]
async fn test_save_commits_changes_across_repositories() {
    let storage = storage().await;

    let setup = storage.unit_of_work();
    let acme = company::Model::new("Acme", "1 Main St", "USA");
    setup.company().add(&acme);
    let mut ann = employee::Model::new("Ann", 25, "Tester");
    setup.employee().add(acme.id, &mut ann);
    setup.save().await.unwrap();

    let manager = storage.unit_of_work();
    let globex = company::Model::new("Globex", "2 Side St", "USA");
    manager.company().add(&globex);
    manager.employee().remove(&ann);
    assert_eq!(manager.save().await.unwrap(), 2);

    let check = storage.unit_of_work();
    assert!(check.company().get_by_id(globex.id, false).await.unwrap().is_some());
    assert!(check.employee().get_one(acme.id, ann.id, false).await.unwrap().is_none());
}

#[tokio::test]
async fn test_rejected_batch_is_not_durable() {
    let storage = storage().await;
    let manager = storage.unit_of_work();

    let acme = company::Model::new("Acme", "1 Main St", "USA");
    manager.company().add(&acme);
    // No company with this id exists, so the foreign key rejects the insert.
    let mut stray = employee::Model::new("Stray", 30, "Unknown");
    manager.employee().add(Uuid::new_v4(), &mut stray);

    let err = manager.save().await.unwrap_err();
    assert!(matches!(err, PersistenceError::Rejected { .. }), "unexpected error: {err}");
    assert!(!manager.context().has_changes(), "failed batch is discarded");

    let check = storage.unit_of_work();
    assert!(check.company().get_by_id(acme.id, false).await.unwrap().is_none());
    assert!(check.employee().get_all_for_company(stray.company_id, false).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_of_missing_row_fails_the_batch() {
    let storage = storage().await;
    let manager = storage.unit_of_work();

    let acme = company::Model::new("Acme", "1 Main St", "USA");
    manager.company().add(&acme);
    let ghost = company::Model::new("Ghost", "Nowhere", "None");
    manager.company().update(&ghost);

    let err = manager.save().await.unwrap_err();
    assert!(
        matches!(err, PersistenceError::RowCount { affected: 0, expected: 1, .. }),
        "unexpected error: {err}"
    );
    assert!(storage.unit_of_work().company().get_by_id(acme.id, false).await.unwrap().is_none());
}

#[tokio::test]
async fn test_commit_refreshes_tracking() {
    let storage = storage().await;
    let manager = storage.unit_of_work();

    let mut acme = company::Model::new("Acme", "1 Main St", "USA");
    manager.company().add(&acme);
    manager.save().await.unwrap();
    assert!(manager.context().is_tracked::<company::Entity>(&acme));

    acme.name = "Acme Holdings".to_string();
    manager.company().update(&acme);
    manager.save().await.unwrap();

    // Snapshot now matches the committed row.
    manager.company().update(&acme);
    assert!(!manager.context().has_changes());

    manager.company().remove(&acme);
    manager.save().await.unwrap();
    assert!(!manager.context().is_tracked::<company::Entity>(&acme));
}
