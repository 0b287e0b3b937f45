use serial_test::serial;

use crate::provisioning::{self, TenantStore};
use crate::tests::fixtures::{ProfessionalFixture, TenantFixture};
use crate::tests::helpers::count_table_rows;
use crate::tests::require_db;

#[tokio::test]
#[serial]
async fn test_add_tenant_with_api_key() {
    let ctx = require_db!();
    let store = TenantStore::new(ctx.db_pool.clone());

    let mut args = TenantFixture::args();
    args.apikey = Some("evo-key-123".into());
    let tenant = provisioning::add_tenant(&store, &args).await.unwrap();

    assert_eq!(count_table_rows(&ctx.db_pool, "tenant_config").await, 1);
    let secret: (String, String) = sqlx::query_as(
        "SELECT secret_key, secret_type FROM tenant_secrets WHERE tenant_id = $1",
    )
    .bind(tenant.tenant_id)
    .fetch_one(&ctx.db_pool)
    .await
    .unwrap();
    assert_eq!(secret, ("evolution_api_key".to_string(), "api_key".to_string()));

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_duplicate_tenant_is_a_conflict() {
    let ctx = require_db!();
    let store = TenantStore::new(ctx.db_pool.clone());

    let args = TenantFixture::args();
    provisioning::add_tenant(&store, &args).await.unwrap();

    // same slug under a different name
    let mut again = TenantFixture::args();
    again.slug = Some(provisioning::build_tenant(&args).unwrap().tenant_slug);
    let err = provisioning::add_tenant(&store, &again).await.unwrap_err();
    assert_eq!(err.error_code(), "CONFLICT");
    assert_eq!(count_table_rows(&ctx.db_pool, "tenant_config").await, 1);
    assert_eq!(count_table_rows(&ctx.db_pool, "tenant_secrets").await, 0);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_professionals_are_scoped_to_their_clinic() {
    let ctx = require_db!();
    let store = TenantStore::new(ctx.db_pool.clone());

    let first = provisioning::add_tenant(&store, &TenantFixture::args()).await.unwrap();
    let second = provisioning::add_tenant(&store, &TenantFixture::args()).await.unwrap();

    let mut pro = ProfessionalFixture::args(&first.tenant_slug);
    pro.slug = Some("dra-ana".into());
    provisioning::add_professional(&store, &pro).await.unwrap();

    // the same slug is free in another clinic
    let mut other = ProfessionalFixture::args(&second.evolution_instance_name);
    other.slug = Some("dra-ana".into());
    provisioning::add_professional(&store, &other).await.unwrap();

    let err = provisioning::add_professional(&store, &pro).await.unwrap_err();
    assert_eq!(err.error_code(), "CONFLICT");

    let listed = store.list_professionals(first.tenant_id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].professional_slug, "dra-ana");
    assert_eq!(listed[0].specialty.as_deref(), Some("Geral"));

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_inactive_clinics_accept_no_professionals_but_still_list() {
    let ctx = require_db!();
    let store = TenantStore::new(ctx.db_pool.clone());

    let tenant = provisioning::add_tenant(&store, &TenantFixture::args()).await.unwrap();
    sqlx::query("UPDATE tenant_config SET is_active = false WHERE tenant_id = $1")
        .bind(tenant.tenant_id)
        .execute(&ctx.db_pool)
        .await
        .unwrap();

    let err = provisioning::add_professional(&store, &ProfessionalFixture::args(&tenant.tenant_name))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
    assert_eq!(err.to_string(), format!("Clinic '{}' not found.", tenant.tenant_name));

    assert!(store.find_clinic(&tenant.tenant_slug, false).await.unwrap().is_some());
    provisioning::list_professionals(&store, &tenant.tenant_slug).await.unwrap();

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn test_list_tenants_newest_first() {
    let ctx = require_db!();
    let store = TenantStore::new(ctx.db_pool.clone());

    let older = provisioning::add_tenant(&store, &TenantFixture::args()).await.unwrap();
    sqlx::query("UPDATE tenant_config SET created_at = NOW() - INTERVAL '1 day' WHERE tenant_id = $1")
        .bind(older.tenant_id)
        .execute(&ctx.db_pool)
        .await
        .unwrap();
    let newer = provisioning::add_tenant(&store, &TenantFixture::args()).await.unwrap();

    let tenants = store.list_tenants().await.unwrap();
    let names: Vec<&str> = tenants.iter().map(|t| t.tenant_name.as_str()).collect();
    assert_eq!(names, vec![newer.tenant_name.as_str(), older.tenant_name.as_str()]);
    assert_eq!(tenants[0].clinic_type.as_deref(), Some("mixed"));
    assert_eq!(tenants[0].subscription_tier.as_deref(), Some("basic"));

    ctx.cleanup().await;
}
