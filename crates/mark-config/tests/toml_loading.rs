//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for sandboxed file and env var manipulation.

use figment::Jail;
use mark_config::{ConfigError, MarkConfig};
use mark_core::{AllowedMarkers, EntityRef};

const SAMPLE: &str = r#"
[database]
path = "app.db"

[reclaim]
page_size = 50
log_every = 0

[entities.user]
table = "users"
marker = true

[entities.admin]
table = "admins"
marker = true

[entities.post]
table = "posts"
id_column = "post_id"

[entities.post.marks]
like = {}
favorite = {}
flag = { by = ["admin"] }
"#;

#[test]
fn loads_full_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file("markable.toml", SAMPLE)?;

        let config = MarkConfig::load_from("markable.toml").expect("config loads");

        assert_eq!(config.database.path, "app.db");
        assert_eq!(config.reclaim.page_size, 50);
        assert_eq!(config.reclaim.log_every, 0);

        let post = config.entities.get("post").expect("post declared");
        assert_eq!(post.table, "posts");
        assert_eq!(post.id_column, "post_id");
        assert_eq!(post.marks.len(), 3);
        assert_eq!(post.marks["flag"].policy(), AllowedMarkers::only(["admin"]));
        assert_eq!(config.entities.get("user").unwrap().id_column, "id");
        Ok(())
    });
}

#[test]
fn registry_built_from_toml_enforces_policies() {
    Jail::expect_with(|jail| {
        jail.create_file("markable.toml", SAMPLE)?;
        let config = MarkConfig::load_from("markable.toml").expect("config loads");
        let registry = config.entities.build_registry();

        let post = EntityRef::new("post", "1");
        assert!(registry.check(&EntityRef::new("user", "1"), &post, "favorite").is_ok());
        assert!(registry.check(&EntityRef::new("user", "1"), &post, "flag").is_err());
        assert!(registry.check(&EntityRef::new("admin", "1"), &post, "flag").is_ok());
        Ok(())
    });
}

#[test]
fn project_file_is_picked_up_by_figment() {
    Jail::expect_with(|jail| {
        jail.create_dir(".markable")?;
        jail.create_file(".markable/config.toml", "[database]\npath = \"project.db\"\n")?;

        let config: MarkConfig = MarkConfig::figment().extract()?;
        assert_eq!(config.database.path, "project.db");
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file("markable.toml", SAMPLE)?;
        jail.set_env("MARKABLE_DATABASE__PATH", "from-env.db");
        jail.set_env("MARKABLE_RECLAIM__PAGE_SIZE", "7");

        let config = MarkConfig::load_from("markable.toml").expect("config loads");
        assert_eq!(config.database.path, "from-env.db");
        assert_eq!(config.reclaim.page_size, 7);
        Ok(())
    });
}

#[test]
fn zero_page_size_fails_validation() {
    Jail::expect_with(|jail| {
        jail.create_file("markable.toml", "[reclaim]\npage_size = 0\n")?;

        let result = MarkConfig::load_from("markable.toml");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        Ok(())
    });
}

#[test]
fn unsafe_table_name_fails_validation() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "markable.toml",
            "[entities.post]\ntable = \"posts; DROP TABLE marks\"\n",
        )?;

        let err = MarkConfig::load_from("markable.toml").unwrap_err();
        assert!(err.to_string().contains("entities.post.table"));
        Ok(())
    });
}
