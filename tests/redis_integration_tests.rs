// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Redis option store using Docker containers.

mod common;

#[cfg(feature = "redis")]
mod redis_tests {
    use optmap::adapters::RedisOptionStore;
    use optmap::domain::{ConfigKey, ConfigValue};
    use optmap::ports::OptionStore;
    use optmap::service::{App, AppOptionsService};
    use testcontainers::{core::WaitFor, runners::AsyncRunner, GenericImage, ImageExt};

    use crate::common as docker_helpers;

    /// Helper to set up a Redis container and store for testing.
    async fn setup_redis_test(
        namespace: &str,
    ) -> Option<(
        testcontainers::ContainerAsync<GenericImage>,
        RedisOptionStore,
        String,
    )> {
        if !docker_helpers::is_docker_available() {
            docker_helpers::print_docker_unavailable_warning("Redis integration test");
            return None;
        }

        let redis_image = GenericImage::new("redis", "7-alpine")
            .with_exposed_port(6379.into())
            .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"));

        let container = redis_image.start().await.ok()?;
        let port = container.get_host_port_ipv4(6379).await.ok()?;

        let url = format!("redis://127.0.0.1:{}", port);

        // Give Redis a moment to start up
        tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;

        let store = RedisOptionStore::new(&url, namespace).unwrap();
        Some((container, store, url))
    }

    #[tokio::test]
    async fn test_redis_set_and_get() {
        let Some((_container, store, url)) = setup_redis_test("test:").await else {
            return;
        };

        store
            .set_option(&ConfigKey::from("apps.bash.title"), &ConfigValue::from("Bash"))
            .unwrap();
        store
            .set_option(&ConfigKey::from("apps.bash.args"), &ConfigValue::from(r#"["-e"]"#))
            .unwrap();

        let options = store.get_options(&ConfigKey::from("apps.bash")).unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[&ConfigKey::from("apps.bash.title")].as_str(), "Bash");

        // Keys are stored under the namespace
        let client = redis::Client::open(url.as_str()).unwrap();
        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let raw: String = redis::cmd("GET")
            .arg("test:apps.bash.title")
            .query_async(&mut conn)
            .await
            .unwrap();
        assert_eq!(raw, "Bash");
    }

    #[tokio::test]
    async fn test_redis_delete_is_segment_aware() {
        let Some((_container, store, _url)) = setup_redis_test("test:").await else {
            return;
        };

        for key in ["apps.x.title", "apps.x.color", "apps.xy.title"] {
            store
                .set_option(&ConfigKey::from(key), &ConfigValue::from("v"))
                .unwrap();
        }

        store.delete_options(&ConfigKey::from("apps.x")).unwrap();

        let remaining = store.get_options(&ConfigKey::from("")).unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(remaining.contains_key(&ConfigKey::from("apps.xy.title")));

        let err = store.delete_options(&ConfigKey::from("apps.x")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_redis_namespaces_are_isolated() {
        let Some((_container, store, url)) = setup_redis_test("one:").await else {
            return;
        };
        let other = RedisOptionStore::new(&url, "two:").unwrap();

        store
            .set_option(&ConfigKey::from("apps.a.title"), &ConfigValue::from("A"))
            .unwrap();

        assert!(other.get_options(&ConfigKey::from("")).unwrap().is_empty());
        assert_eq!(store.namespace(), "one:");
    }

    #[tokio::test]
    async fn test_redis_backed_app_service() {
        let Some((_container, store, url)) = setup_redis_test("svc:").await else {
            return;
        };

        let app = App {
            active: true,
            title: "Ansible".to_string(),
            args: vec!["-v".to_string()],
            ..App::default()
        };

        let service = AppOptionsService::load(store).unwrap();
        service.set_app("ansible", &app).unwrap();

        let reloaded = AppOptionsService::load(RedisOptionStore::new(&url, "svc:").unwrap()).unwrap();
        assert_eq!(reloaded.get_app("ansible").unwrap(), app);
    }
}
