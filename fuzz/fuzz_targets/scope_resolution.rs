#![no_main]

use libfuzzer_sys::fuzz_target;
use scoped_di::{DiError, Requirement, Resolver, Scope, ServiceCollection};

struct Config(u8);
struct Session(u8);
struct Handler;

// Each byte is one operation against a small scope tree.
fuzz_target!(|data: &[u8]| {
    let mut services = ServiceCollection::new();
    services.add_singleton(Config(7));
    services.add_scoped_factory::<Session, _>(&[Requirement::of::<Config>()], |r| {
        Ok(Session(r.get::<Config>()?.0))
    });
    services.add_transient_factory::<Handler, _>(&[Requirement::of::<Session>()], |r| {
        r.get::<Session>()?;
        Ok(Handler)
    });
    let root = services.build().expect("registration set is valid");

    let mut scopes: Vec<Scope> = vec![root.clone()];
    for &op in data.iter().take(256) {
        let target = scopes[(op as usize >> 3) % scopes.len()].clone();
        match op & 0x07 {
            0 => scopes.push(target.create_scope()),
            1 => target.dispose(),
            2 => match target.get::<Config>() {
                Ok(config) => assert_eq!(config.0, 7),
                Err(err) => assert!(matches!(err, DiError::ScopeDisposed)),
            },
            3 | 4 => {
                let result = target.get::<Session>();
                if !target.is_disposed() && !root.is_disposed() {
                    assert!(result.is_ok());
                } else {
                    assert!(matches!(result, Ok(_) | Err(DiError::ScopeDisposed)));
                }
            }
            _ => {
                let _ = target.get::<Handler>();
            }
        }
    }
    for scope in scopes.iter().rev() {
        scope.dispose();
    }
});
