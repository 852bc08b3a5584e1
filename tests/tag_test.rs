use inkutils::error::Error;
use inkutils::tag::{builtin_registry, RootTag, TagRegistry};
use serde_yaml::{Mapping, Value};
use std::cell::Cell;
use std::rc::Rc;

fn tokens(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn sample_config() -> Mapping {
    serde_yaml::from_str("app:\n  name: demo\n  ports: [80, 443]\n  opts: {debug: true}\n")
        .unwrap()
}

#[test]
fn test_dispatch_returns_raw_value() {
    let mut registry = TagRegistry::new();
    registry.register_fn("answer", |_| Ok(Value::from(42)));
    registry.register_fn("echo", |args| Ok(Value::from(args.join("+"))));

    assert_eq!(registry.parse(&tokens(&["answer"])).unwrap(), Value::from(42));
    assert_eq!(
        registry.parse(&tokens(&["echo", "a", "b c"])).unwrap(),
        Value::from("a+b c")
    );
}

#[test]
fn test_unknown_tag_is_not_supported() {
    let registry = builtin_registry("/srv/ink", Mapping::new());
    match registry.parse(&tokens(&["nope", "x"])) {
        Err(Error::TagNotSupported { tag }) => assert_eq!(tag, "nope"),
        other => panic!("Expected TagNotSupported, got {other:?}"),
    }
    assert!(matches!(registry.parse(&[]), Err(Error::TagNotSupported { .. })));
}

#[test]
fn test_registration_normalizes_names() {
    let mut registry = TagRegistry::new();
    registry.register_fn("__Upper", |_| Ok(Value::Null));
    assert!(registry.contains("upper"));
    assert!(!registry.contains("__Upper"));

    let registry = builtin_registry("/srv/ink", Mapping::new());
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["root", "config"]);
}

#[test]
fn test_reregistering_replaces_handler() {
    let mut registry = TagRegistry::new();
    registry.register(RootTag::new("/old")).register(RootTag::new("/new"));
    assert_eq!(registry.parse_to_string(&tokens(&["root"])).unwrap(), "/new");
}

#[test]
fn test_root_ignores_arguments() {
    let registry = builtin_registry("/srv/ink", Mapping::new());
    assert_eq!(registry.parse_to_string(&tokens(&["root", "x", "y"])).unwrap(), "/srv/ink");
}

#[test]
fn test_config_tag_resolves_values() {
    let registry = builtin_registry("/srv/ink", sample_config());
    assert_eq!(registry.parse_to_string(&tokens(&["config", "app.name"])).unwrap(), "demo");
    assert_eq!(registry.parse(&tokens(&["config", "app.ports.0"])).unwrap(), Value::from(80));
    assert_eq!(
        registry.parse_to_string(&tokens(&["config", "app.opts"])).unwrap(),
        r#"{"debug":true}"#
    );
}

#[test]
fn test_config_tag_rejects_bad_keys() {
    let registry = builtin_registry("/srv/ink", sample_config());
    for key in ["app.name.first", "app.missing", "app.ports.9"] {
        assert!(matches!(
            registry.parse(&tokens(&["config", key])),
            Err(Error::KeyInvalid { .. })
        ));
    }
}

#[test]
fn test_config_tag_argument_count() {
    let registry = builtin_registry("/srv/ink", sample_config());
    assert!(matches!(
        registry.parse(&tokens(&["config"])),
        Err(Error::TagArguments { expected: 1, found: 0, .. })
    ));
    assert!(matches!(
        registry.parse(&tokens(&["config", "a", "b"])),
        Err(Error::TagArguments { expected: 1, found: 2, .. })
    ));
}

struct CountingSource {
    loads: Rc<Cell<usize>>,
}

impl inkutils::config::ConfigSource for CountingSource {
    fn load(&self) -> inkutils::error::Result<Mapping> {
        self.loads.set(self.loads.get() + 1);
        Ok(sample_config())
    }
}

#[test]
fn test_config_is_loaded_on_every_evaluation() {
    let loads = Rc::new(Cell::new(0));
    let registry = builtin_registry("/srv/ink", CountingSource { loads: loads.clone() });

    let first = registry.parse(&tokens(&["config", "app.name"])).unwrap();
    let second = registry.parse(&tokens(&["config", "app.name"])).unwrap();

    assert_eq!(first, second);
    assert_eq!(loads.get(), 2);
}

#[test]
fn test_config_tag_renders_null_keyed_mapping() {
    let config: Mapping = serde_yaml::from_str("app:\n  nul: {~: x}\n  port: 80\n").unwrap();
    let registry = builtin_registry("/srv/ink", config);

    assert_eq!(
        registry.parse_to_string(&tokens(&["config", "app.nul"])).unwrap(),
        r#"{"null":"x"}"#
    );
    assert_eq!(
        registry.parse_to_string(&tokens(&["config", "app"])).unwrap(),
        r#"{"nul":{"null":"x"},"port":80}"#
    );

    let line = inkutils::dotfile::render_line(
        &registry,
        &inkutils::dotfile::Delimiter::default(),
        "v={% config app.nul %}\n",
    )
    .unwrap();
    assert_eq!(line, "v='{\"null\":\"x\"}'\n");
}
