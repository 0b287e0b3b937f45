pub mod tenants_db;
