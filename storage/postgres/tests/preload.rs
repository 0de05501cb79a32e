mod common;

use anyhow::Result;
use preload_filter::{build, collect, Condition, QueryPlan};
use preload_model::{User, UserFilterV3, USER};
use preload_storage_common::StorageExecutor;

fn users(records: Vec<preload_storage_common::Record>) -> Result<Vec<User>> {
    Ok(records.iter().map(|r| r.into_entity::<User>()).collect::<Result<Vec<_>, _>>()?)
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_postgres_preloads_seed_data() -> Result<()> {
    let (_container, executor) = common::create_postgres_container().await?;

    let plan = QueryPlan::builder().eager_load_all(&preload_model::catalog(), USER).build();
    let loaded = users(executor.execute(&plan, USER).await?)?;
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "John Doe");
    assert_eq!(loaded[0].devices.len(), 2);
    let admin = loaded[0].groups.iter().find(|g| g.name == "admin").unwrap();
    assert_eq!(admin.permissions.iter().map(|p| p.code.as_str()).collect::<Vec<_>>(), vec!["write", "execute"]);

    Ok(())
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_postgres_static_filter() -> Result<()> {
    let (_container, executor) = common::create_postgres_container().await?;

    let filter = UserFilterV3 { device_ids: vec![2], permission: Some("read".into()), ..Default::default() };
    let loaded = users(executor.execute(&build(collect(&filter)), USER).await?)?;
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].devices.iter().map(|d| d.id).collect::<Vec<_>>(), vec![2]);
    for group in &loaded[0].groups {
        assert!(group.permissions.iter().all(|p| p.code == "read"));
    }

    let plan = QueryPlan::builder().root(Condition::scalar("users.name = ?", "nobody")).build();
    assert!(executor.execute(&plan, USER).await?.is_empty());
    Ok(())
}
