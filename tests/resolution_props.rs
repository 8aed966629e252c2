//! Property tests over envlist expansion and profile resolution.

use std::path::Path;

use envmatrix::domain::{MatrixConfig, ResolveOptions, resolve};
use proptest::prelude::*;

fn factor() -> impl Strategy<Value = String> {
    "[a-z]{2,6}"
}

proptest! {
    #[test]
    fn every_listed_name_resolves_deterministically(
        pythons in proptest::collection::btree_set(
            prop::sample::select(vec!["36", "37", "38", "39", "310", "311", "312"]),
            1..4,
        ),
        extras in proptest::collection::btree_set(factor(), 0..3),
        posargs in proptest::collection::vec("[a-zA-Z0-9_=-]{1,8}", 0..3),
    ) {
        let pythons: Vec<&str> = pythons.into_iter().collect();
        let extras: Vec<String> = extras.into_iter().collect();
        let envlist = if extras.is_empty() {
            format!("py{{{}}}", pythons.join(","))
        } else {
            format!("py{{{}}}{{,-{}}}", pythons.join(","), extras.join(",-"))
        };
        let text = format!(
            "[tox]\nenvlist = {envlist}\n\n[testenv]\nchangedir = .tmp/{{envname}}\ncommands = run {{envname}} {{posargs}}\n"
        );

        let config = MatrixConfig::parse(&text, Path::new("/project")).unwrap();
        prop_assert_eq!(config.env_list.len(), pythons.len() * (extras.len() + 1));

        let options = ResolveOptions { posargs: posargs.clone(), ..Default::default() };
        for name in config.names() {
            let first = resolve(&config, &name, &options).unwrap();
            let reparsed = MatrixConfig::parse(&text, Path::new("/project")).unwrap();
            let again = resolve(&reparsed, &name, &options).unwrap();
            prop_assert_eq!(&first, &again);

            prop_assert_eq!(&first.working_dir, &Path::new("/project/.tmp").join(&name));
            let mut argv = vec!["run".to_string(), name.clone()];
            argv.extend(posargs.iter().cloned());
            prop_assert_eq!(&first.commands[0].argv, &argv);
            prop_assert!(first.basepython.as_deref().is_some_and(|p| p.starts_with("python3")));
        }
    }
}
