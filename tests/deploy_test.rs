use inkutils::deploy::{collect_dotfiles, deploy_tree};
use inkutils::dotfile::Delimiter;
use inkutils::error::Error;
use inkutils::tag::builtin_registry;
use serde_yaml::Mapping;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_collect_dotfiles_is_sorted_and_recursive() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("shell")).unwrap();
    fs::write(root.join("shell").join(".zshrc"), "").unwrap();
    fs::write(root.join(".vimrc"), "").unwrap();

    let files = collect_dotfiles(root).unwrap();
    assert_eq!(files, vec![root.join(".vimrc"), root.join("shell").join(".zshrc")]);
}

#[test]
fn test_plain_tree_deploys_unchanged() {
    let temp_dir = TempDir::new().unwrap();
    let dotfiles = temp_dir.path().join("dotfiles");
    let home = temp_dir.path().join("home");
    fs::create_dir_all(&dotfiles).unwrap();
    fs::create_dir_all(&home).unwrap();
    fs::write(dotfiles.join(".vimrc"), "set number\nsyntax on\n").unwrap();
    fs::write(dotfiles.join(".inputrc"), "set editing-mode vi\n# stop\n  raw\t\n").unwrap();

    let registry = builtin_registry("/srv/ink", Mapping::new());
    deploy_tree(&registry, &dotfiles, &home, &Delimiter::default()).unwrap();

    fs::write(dotfiles.join(".inputrc"), "set editing-mode vi\n  raw\t\n").unwrap();
    assert!(!dir_diff::is_different(&dotfiles, &home).unwrap());
}

#[test]
fn test_nested_templates_are_flattened() {
    let temp_dir = TempDir::new().unwrap();
    let dotfiles = temp_dir.path().join("dotfiles");
    let home = temp_dir.path().join("home");
    fs::create_dir_all(dotfiles.join("git")).unwrap();
    fs::write(dotfiles.join("git").join(".gitconfig"), "[user]\n  name = {% config user %}\n")
        .unwrap();

    let config: Mapping = serde_yaml::from_str("user: ink\n").unwrap();
    let registry = builtin_registry("/srv/ink", config);
    let deployed = deploy_tree(&registry, &dotfiles, &home, &Delimiter::default()).unwrap();

    let target: PathBuf = home.join(".gitconfig");
    assert_eq!(deployed.len(), 1);
    assert_eq!(deployed[0].0, target);
    assert_eq!(deployed[0].1.rendered_lines, 2);
    assert_eq!(fs::read_to_string(&target).unwrap(), "[user]\n  name = ink\n");
}

#[test]
fn test_first_failure_stops_deployment() {
    let temp_dir = TempDir::new().unwrap();
    let dotfiles = temp_dir.path().join("dotfiles");
    let home = temp_dir.path().join("home");
    fs::create_dir_all(&dotfiles).unwrap();
    fs::write(dotfiles.join("a"), "{% unknown %}\n").unwrap();
    fs::write(dotfiles.join("b"), "fine\n").unwrap();

    let registry = builtin_registry("/srv/ink", Mapping::new());
    assert!(deploy_tree(&registry, &dotfiles, &home, &Delimiter::default()).is_err());
    assert!(!home.join("b").exists());
}

#[test]
fn test_duplicate_names_are_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let dotfiles = temp_dir.path().join("dotfiles");
    let home = temp_dir.path().join("home");
    fs::create_dir_all(dotfiles.join("linux")).unwrap();
    fs::create_dir_all(dotfiles.join("mac")).unwrap();
    fs::write(dotfiles.join(".aliases"), "alias l=ls\n").unwrap();
    fs::write(dotfiles.join("linux").join(".profile"), "linux\n").unwrap();
    fs::write(dotfiles.join("mac").join(".profile"), "mac\n").unwrap();

    let registry = builtin_registry("/srv/ink", Mapping::new());
    let err = deploy_tree(&registry, &dotfiles, &home, &Delimiter::default()).unwrap_err();

    match err {
        Error::ConfigError(message) => {
            assert!(message.contains("linux"), "{message}");
            assert!(message.contains("mac"), "{message}");
        }
        other => panic!("Expected ConfigError, got {other:?}"),
    }
    assert!(!home.join(".aliases").exists());
    assert!(!home.join(".profile").exists());
}
