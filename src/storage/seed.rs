//! Sample companies and employees for a fresh database.

use anyhow::{Context, Result};

use crate::entities::{company, employee};
use crate::repositories::RepositoryManager;

/// Stage and commit the sample data set. Returns the number of rows written.
pub async fn seed_sample_data(manager: &RepositoryManager) -> Result<usize> {
    let it_solutions = company::Model::new("IT_Solutions Ltd", "583 Wall Dr. Gwynn Oak, MD 21207", "USA");
    let admin_solutions = company::Model::new("Admin_Solutions Ltd", "312 Forest Avenue, BF 923", "USA");
    manager.company().add(&it_solutions);
    manager.company().add(&admin_solutions);

    let staff = [
        (it_solutions.id, employee::Model::new("Sam Raiden", 26, "Software developer")),
        (it_solutions.id, employee::Model::new("Jana McLeaf", 30, "Software developer")),
        (admin_solutions.id, employee::Model::new("Kane Miller", 35, "Administrator")),
    ];
    for (company_id, mut employee) in staff {
        manager.employee().add(company_id, &mut employee);
    }

    manager.save().await.context("Failed to save sample data")
}
