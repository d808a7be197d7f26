//! Integration tests for the file-backed service container
//!
//! Exercises the full cycle: handler registration, provider registration
//! persisted to disk, lazy binding with included services and the
//! memoization boundary across unregistration.

use std::fs;
use std::sync::Arc;

use wirebox_core::{
    BindingState, ConfigFormat, CoreError, FileProviderStore, IncludedServices, ProviderDetails,
    ProviderStore, RegistryConfig, Service, ServiceContainer, ServiceHandler, ServiceInfo,
};

/// Test transport shared by mailers
struct SmtpTransport {
    info: ServiceInfo,
    host: String,
}

impl Service for SmtpTransport {
    fn service_name(&self) -> &str {
        self.info.service_name()
    }
}

impl ServiceHandler for SmtpTransport {
    fn create(_included: IncludedServices) -> Result<Self, CoreError> {
        Ok(Self {
            info: ServiceInfo::new("transport"),
            host: "localhost:25".to_string(),
        })
    }
}

/// SMTP mailer, optionally backed by a transport
struct SmtpMailer {
    info: ServiceInfo,
    transport: Option<Arc<SmtpTransport>>,
}

impl SmtpMailer {
    fn send(&self, to: &str) -> Result<String, String> {
        match &self.transport {
            Some(transport) => Ok(format!("sent to {} via {}", to, transport.host)),
            None => Err("no transport".to_string()),
        }
    }
}

impl Service for SmtpMailer {
    fn service_name(&self) -> &str {
        self.info.service_name()
    }

    fn service_title(&self) -> Option<&str> {
        self.info.service_title()
    }

    fn include_services(&self) -> Vec<String> {
        self.info.include_services()
    }
}

impl ServiceHandler for SmtpMailer {
    fn create(included: IncludedServices) -> Result<Self, CoreError> {
        Ok(Self {
            info: ServiceInfo::new("mailer")
                .with_title("SMTP mailer")
                .with_include(["transport"]),
            transport: included.get::<SmtpTransport>("transport"),
        })
    }
}

fn file_container(path: &std::path::Path) -> ServiceContainer {
    let mut container = ServiceContainer::new(FileProviderStore::new(path));
    container
        .handlers_mut()
        .register_as::<SmtpMailer>("SmtpMailer")
        .register_as::<SmtpTransport>("SmtpTransport");
    container
}

#[test]
fn test_mailer_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("service-providers.json");
    let mut container = file_container(&path);

    assert!(container
        .register(ProviderDetails::new("mailer", "SmtpMailer"))
        .unwrap());
    assert!(container.has_provider("mailer").unwrap());
    assert!(!container.has("mailer"));

    let mailer = container.get_as::<SmtpMailer>("mailer").unwrap().unwrap();
    assert_eq!(mailer.service_name(), "mailer");
    assert!(container.has("mailer"));

    assert!(container.unregister("mailer").unwrap());
    assert!(!container.has_provider("mailer").unwrap());

    let again = container.get_as::<SmtpMailer>("mailer").unwrap().unwrap();
    assert!(Arc::ptr_eq(&mailer, &again));

    // the file no longer lists the provider
    let persisted = FileProviderStore::new(&path).load().unwrap().unwrap();
    assert!(persisted.is_empty());
}

#[test]
fn test_included_transport_is_injected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("service-providers.yaml");
    let mut container = file_container(&path);

    container
        .register(ProviderDetails::new("transport", "SmtpTransport"))
        .unwrap();
    container
        .register(ProviderDetails::new("mailer", "SmtpMailer").with_include(["transport"]))
        .unwrap();

    let mailer = container.get_as::<SmtpMailer>("mailer").unwrap().unwrap();
    let transport = container
        .get_as::<SmtpTransport>("transport")
        .unwrap()
        .unwrap();

    assert!(Arc::ptr_eq(mailer.transport.as_ref().unwrap(), &transport));
    assert_eq!(mailer.send("ops@example.com").unwrap(), "sent to ops@example.com via localhost:25");
    assert_eq!(container.binding_state("transport"), BindingState::Instantiated);

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("handler: SmtpMailer"));
}

#[test]
fn test_registry_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = RegistryConfig::new(dir.path().join("providers.yml"));
    assert_eq!(config.resolved_format(), ConfigFormat::Yaml);

    {
        let mut container = ServiceContainer::from_config(&config).unwrap();
        container.handlers_mut().register_as::<SmtpMailer>("SmtpMailer");

        let prototype = SmtpMailer::create(IncludedServices::new()).unwrap();
        assert!(container.register_service(&prototype).unwrap());
    }

    let mut restarted = ServiceContainer::from_config(&config).unwrap();
    restarted
        .handlers_mut()
        .register_as::<SmtpMailer>("SmtpMailer")
        .register_as::<SmtpTransport>("SmtpTransport");

    let descriptor = restarted.get_provider("mailer").unwrap().unwrap();
    assert_eq!(descriptor.handler, "SmtpMailer");
    assert_eq!(descriptor.title.as_deref(), Some("SMTP mailer"));
    assert_eq!(descriptor.include, vec!["transport"]);

    // transport has no provider yet, so the mailer is built without it
    let mailer = restarted.get_as::<SmtpMailer>("mailer").unwrap().unwrap();
    assert!(mailer.send("ops@example.com").is_err());
}

#[test]
fn test_unregister_by_handler_updates_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("providers.json");
    let mut container = file_container(&path);

    container
        .register(ProviderDetails::new("transport", "SmtpTransport"))
        .unwrap();
    container
        .register(ProviderDetails::new("mailer", "SmtpMailer"))
        .unwrap();

    assert!(container.unregister("SmtpTransport").unwrap());

    let persisted = FileProviderStore::new(&path).load().unwrap().unwrap();
    assert_eq!(persisted.keys().collect::<Vec<_>>(), vec!["mailer"]);
}

#[test]
fn test_unregister_unknown_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("providers.json");
    let mut container = file_container(&path);

    container
        .register(ProviderDetails::new("mailer", "SmtpMailer"))
        .unwrap();
    let before = fs::read_to_string(&path).unwrap();

    assert!(container.unregister("ghost").unwrap());
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_unwritable_store_reports_false() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("providers.json");
    // a directory sits where the temporary file would be written
    fs::create_dir(dir.path().join("providers.json.tmp")).unwrap();
    let mut container = file_container(&path);

    let persisted = container
        .register(ProviderDetails::new("mailer", "SmtpMailer"))
        .unwrap();

    assert!(!persisted);
    assert!(container.has_provider("mailer").unwrap());
}

#[test]
fn test_corrupt_store_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("providers.json");
    fs::write(&path, "[1, 2, 3]").unwrap();
    let mut container = file_container(&path);

    assert!(matches!(container.providers(), Err(CoreError::Json(_))));
    assert!(container.get("mailer").is_err());
}

#[test]
fn test_external_edit_is_visible_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("providers.json");
    let mut container = file_container(&path);
    assert!(container.providers().unwrap().is_empty());

    fs::write(
        &path,
        r#"{ "transport": { "name": "transport", "handler": "SmtpTransport" } }"#,
    )
    .unwrap();

    assert!(!container.has_provider("transport").unwrap());
    container.load(true).unwrap();
    assert!(container.has_provider("transport").unwrap());
    assert!(container.get("transport").unwrap().is_some());
}
