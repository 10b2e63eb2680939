use company_employees::entities::{company, employee};
use company_employees::query::{EmployeeParameters, EmployeeQueryExt};
use company_employees::storage::Storage;
use company_employees::RepositoryManager;
use sea_orm::{DbBackend, EntityTrait, QueryTrait};
use uuid::Uuid;

async fn storage_with(staff: &[(&str, i32)]) -> (Storage, Uuid) {
    let storage = Storage::in_memory().await.expect("in-memory storage should open");
    let manager = storage.unit_of_work();
    let company = company::Model::new("Acme", "1 Main St", "USA");
    manager.company().add(&company);
    for (name, age) in staff {
        let mut employee = employee::Model::new(*name, *age, "Developer");
        manager.employee().add(company.id, &mut employee);
    }
    manager.save().await.expect("seed should commit");
    (storage, company.id)
}

async fn names(manager: &RepositoryManager, company_id: Uuid, parameters: &EmployeeParameters) -> Vec<String> {
    manager
        .employee()
        .get_employees(company_id, parameters, false)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect()
}

fn ordered_by(order_by: &str) -> EmployeeParameters {
    EmployeeParameters {
        order_by: Some(order_by.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_sort_name_descending() {
    let (storage, company_id) = storage_with(&[("Ann", 25), ("Bob", 30)]).await;
    let manager = storage.unit_of_work();

    assert_eq!(names(&manager, company_id, &ordered_by("name desc")).await, vec!["Bob", "Ann"]);
}

#[tokio::test]
async fn test_sort_breaks_ties_with_later_keys() {
    let (storage, company_id) = storage_with(&[("Ann", 30), ("Cid", 30), ("Bob", 25), ("Dee", 40)]).await;
    let manager = storage.unit_of_work();

    assert_eq!(
        names(&manager, company_id, &ordered_by("age, name desc")).await,
        vec!["Bob", "Cid", "Ann", "Dee"]
    );
}

#[tokio::test]
async fn test_unknown_sort_field_falls_back_to_name() {
    let (storage, company_id) = storage_with(&[("Cid", 20), ("Ann", 40), ("Bob", 30)]).await;
    let manager = storage.unit_of_work();

    assert_eq!(
        names(&manager, company_id, &ordered_by("salary desc")).await,
        vec!["Ann", "Bob", "Cid"]
    );

    let unsorted = EmployeeParameters {
        order_by: None,
        ..Default::default()
    };
    assert_eq!(names(&manager, company_id, &unsorted).await, vec!["Ann", "Bob", "Cid"]);
}

#[tokio::test]
async fn test_inverted_age_range_is_empty_not_an_error() {
    let (storage, company_id) = storage_with(&[("Ann", 25), ("Bob", 55)]).await;
    let manager = storage.unit_of_work();

    let parameters = EmployeeParameters {
        min_age: 50,
        max_age: 20,
        ..Default::default()
    };
    assert!(!parameters.valid_age_range());
    let page = manager.employee().get_employees(company_id, &parameters, false).await.unwrap();
    assert!(page.is_empty());
    assert_eq!(page.meta_data.total_count, 0);
}

#[tokio::test]
async fn test_age_range_is_inclusive() {
    let (storage, company_id) = storage_with(&[("Ann", 25), ("Bob", 30), ("Cid", 35), ("Dee", 40)]).await;
    let manager = storage.unit_of_work();

    let parameters = EmployeeParameters {
        min_age: 30,
        max_age: 35,
        ..Default::default()
    };
    assert_eq!(names(&manager, company_id, &parameters).await, vec!["Bob", "Cid"]);
}

#[tokio::test]
async fn test_search_is_case_insensitive_substring() {
    let (storage, company_id) = storage_with(&[("Jana McLeaf", 30), ("Sam Raiden", 26), ("Kane Miller", 35)]).await;
    let manager = storage.unit_of_work();

    let parameters = EmployeeParameters {
        search_term: Some("  MC ".to_string()),
        ..Default::default()
    };
    assert_eq!(names(&manager, company_id, &parameters).await, vec!["Jana McLeaf"]);

    let blank = EmployeeParameters {
        search_term: Some("   ".to_string()),
        ..Default::default()
    };
    assert_eq!(names(&manager, company_id, &blank).await.len(), 3);
}

#[tokio::test]
async fn test_search_treats_wildcards_literally() {
    let (storage, company_id) = storage_with(&[("Ann", 25), ("100% Bob", 30), ("Who? [Cid]*", 40)]).await;
    let manager = storage.unit_of_work();

    for (term, expected) in [("%", "100% Bob"), ("?", "Who? [Cid]*"), ("[cid]*", "Who? [Cid]*")] {
        let parameters = EmployeeParameters {
            search_term: Some(term.to_string()),
            ..Default::default()
        };
        assert_eq!(names(&manager, company_id, &parameters).await, vec![expected], "term {term:?}");
    }
}

#[tokio::test]
async fn test_search_folds_case_beyond_ascii() {
    let (storage, company_id) = storage_with(&[("Émile Zola", 40), ("Ann", 25), ("Ödön Horváth", 37)]).await;
    let manager = storage.unit_of_work();

    let cases = [
        ("émile", "Émile Zola"),
        ("ÉMILE", "Émile Zola"),
        ("HORVÁTH", "Ödön Horváth"),
        ("ödön", "Ödön Horváth"),
    ];
    for (term, expected) in cases {
        let parameters = EmployeeParameters {
            search_term: Some(term.to_string()),
            ..Default::default()
        };
        assert_eq!(names(&manager, company_id, &parameters).await, vec![expected], "term {term:?}");
    }
}

#[tokio::test]
async fn test_page_beyond_sqlite_range_is_empty() {
    let (storage, company_id) = storage_with(&[("Ann", 25), ("Bob", 30)]).await;
    let manager = storage.unit_of_work();

    let parameters = EmployeeParameters {
        page_number: u64::MAX,
        ..Default::default()
    };
    let page = manager.employee().get_employees(company_id, &parameters, false).await.unwrap();
    assert!(page.is_empty());
    assert_eq!(page.meta_data.total_count, 2);
    assert!(!page.meta_data.has_next);
}

#[tokio::test]
async fn test_pipeline_combines_filter_search_sort_and_paging() {
    let staff = [("Anna", 22), ("Joanna", 31), ("Hannah", 45), ("Ann", 60), ("Annika", 33), ("Bob", 35)];
    let (storage, company_id) = storage_with(&staff).await;
    let manager = storage.unit_of_work();

    let parameters = EmployeeParameters {
        page_number: 2,
        page_size: 2,
        min_age: 25,
        max_age: 50,
        search_term: Some("ann".to_string()),
        order_by: Some("age desc".to_string()),
    };
    let page = manager.employee().get_employees(company_id, &parameters, false).await.unwrap();

    // Matches by age desc: Hannah (45), Annika (33), Joanna (31).
    assert_eq!(page.meta_data.total_count, 3);
    assert_eq!(page.meta_data.total_pages, 2);
    assert_eq!(page.meta_data.current_page, 2);
    assert!(page.meta_data.has_previous);
    assert!(!page.meta_data.has_next);
    let names: Vec<_> = page.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Joanna"]);
}

#[test]
fn test_shape_matches_stages_applied_in_order() {
    let parameters = EmployeeParameters {
        min_age: 20,
        max_age: 40,
        search_term: Some("an".to_string()),
        order_by: Some("age desc, name".to_string()),
        ..Default::default()
    };

    let shaped = employee::Entity::find().shape(&parameters).build(DbBackend::Sqlite).to_string();
    let staged = employee::Entity::find()
        .filter_by_age(20, 40)
        .search_by_name(Some("an"))
        .sort(Some("age desc, name"))
        .build(DbBackend::Sqlite)
        .to_string();
    assert_eq!(shaped, staged);
}

#[tokio::test]
async fn test_query_is_deferred_until_materialized() {
    let (storage, company_id) = storage_with(&[("Ann", 25)]).await;
    let manager = storage.unit_of_work();

    // A later insert is visible to a query built but not yet run.
    let select = employee::Entity::find().sort(Some("name"));
    let mut bob = employee::Model::new("Bob", 30, "Developer");
    manager.employee().add(company_id, &mut bob);
    manager.save().await.unwrap();

    let all = select.all(storage.connection()).await.unwrap();
    assert_eq!(all.len(), 2);
}
