use http::Method;
use std::sync::{Arc, Mutex};
use trellis::context::{Context, RequestParts};
use trellis::{handler_fn, Engine, Handler, RegistrationError, RouteResolution, RouterConfig};

fn tagged(tag: &'static str, log: Arc<Mutex<Vec<&'static str>>>) -> Handler {
    handler_fn(move |ctx| {
        log.lock().unwrap().push(tag);
        ctx.string(200, tag);
    })
}

fn run_match(engine: Engine, method: Method, path: &str) -> Option<Context> {
    let (router, no_route) = engine.freeze();
    match router.resolve(&method, path) {
        RouteResolution::Matched(m) => {
            let request = RequestParts {
                method,
                path: path.to_string(),
                ..Default::default()
            };
            let mut ctx = Context::new(request, m.params, m.chain, no_route);
            ctx.run();
            Some(ctx)
        }
        _ => None,
    }
}

#[test]
fn literal_route_matches() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let engine = Engine::new();
    engine.get("/users", vec![tagged("users", Arc::clone(&log))]).unwrap();

    let ctx = run_match(engine, Method::GET, "/users").unwrap();
    assert_eq!(ctx.response().status, 200);
    assert_eq!(*log.lock().unwrap(), vec!["users"]);
}

#[test]
fn param_route_binds_segment() {
    let engine = Engine::new();
    engine
        .get(
            "/users/:id",
            vec![handler_fn(|ctx| {
                let id = ctx.param("id").to_string();
                ctx.string(200, &id);
            })],
        )
        .unwrap();

    let ctx = run_match(engine, Method::GET, "/users/42").unwrap();
    assert_eq!(ctx.response().body, b"42");
}

#[test]
fn literal_beats_param_beats_wildcard() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let engine = Engine::new();
    engine.get("/files/special", vec![tagged("literal", Arc::clone(&log))]).unwrap();
    engine.get("/files/:name", vec![tagged("param", Arc::clone(&log))]).unwrap();
    engine.get("/files/*rest", vec![tagged("wildcard", Arc::clone(&log))]).unwrap();

    let (router, _) = engine.freeze();
    for (path, expected) in [
        ("/files/special", "literal"),
        ("/files/other", "param"),
        ("/files/a/b/c", "wildcard"),
    ] {
        match router.resolve(&Method::GET, path) {
            RouteResolution::Matched(m) => {
                let mut ctx = Context::new(
                    RequestParts::default(),
                    m.params,
                    m.chain,
                    None,
                );
                ctx.run();
                assert_eq!(ctx.response().body, expected.as_bytes(), "path {path}");
            }
            other => panic!("no match for {path}: {other:?}"),
        }
    }
}

#[test]
fn wildcard_binds_remaining_path() {
    let engine = Engine::new();
    engine
        .get(
            "/static/*filepath",
            vec![handler_fn(|ctx| {
                let p = ctx.param("filepath").to_string();
                ctx.string(200, &p);
            })],
        )
        .unwrap();

    let ctx = run_match(engine, Method::GET, "/static/css/site.css").unwrap();
    assert_eq!(ctx.response().body, b"css/site.css");
}

#[test]
fn wildcard_requires_at_least_one_segment() {
    let engine = Engine::new();
    engine.get("/static/*filepath", vec![handler_fn(|ctx| ctx.write_status(200))]).unwrap();
    let (router, _) = engine.freeze();

    assert!(matches!(
        router.resolve(&Method::GET, "/static"),
        RouteResolution::NotFound
    ));
    // The trailing empty segment counts.
    assert!(matches!(
        router.resolve(&Method::GET, "/static/"),
        RouteResolution::Matched(_)
    ));
}

#[test]
fn trailing_slash_routes_are_distinct() {
    let engine = Engine::new();
    engine.get("/a", vec![handler_fn(|ctx| ctx.string(200, "no-slash"))]).unwrap();
    engine.get("/a/", vec![handler_fn(|ctx| ctx.string(200, "slash"))]).unwrap();

    let (router, _) = engine.freeze();
    for (path, expected) in [("/a", "no-slash"), ("/a/", "slash")] {
        match router.resolve(&Method::GET, path) {
            RouteResolution::Matched(m) => {
                let mut ctx = Context::new(RequestParts::default(), m.params, m.chain, None);
                ctx.run();
                assert_eq!(ctx.response().body, expected.as_bytes());
            }
            other => panic!("no match for {path}: {other:?}"),
        }
    }
}

#[test]
fn unmatched_method_is_not_found_by_default() {
    let engine = Engine::new();
    engine.get("/users", vec![handler_fn(|ctx| ctx.write_status(200))]).unwrap();
    let (router, _) = engine.freeze();
    assert!(matches!(
        router.resolve(&Method::POST, "/users"),
        RouteResolution::NotFound
    ));
}

#[test]
fn method_not_allowed_when_enabled() {
    let engine = Engine::with_config(RouterConfig {
        handle_method_not_allowed: true,
        ..RouterConfig::default()
    });
    engine.get("/users", vec![handler_fn(|ctx| ctx.write_status(200))]).unwrap();
    let (router, _) = engine.freeze();

    assert!(matches!(
        router.resolve(&Method::POST, "/users"),
        RouteResolution::MethodNotAllowed
    ));
    assert!(matches!(
        router.resolve(&Method::POST, "/missing"),
        RouteResolution::NotFound
    ));
}

#[test]
fn duplicate_registration_fails() {
    let engine = Engine::new();
    engine.get("/users", vec![handler_fn(|ctx| ctx.write_status(200))]).unwrap();
    let err = engine
        .get("/users", vec![handler_fn(|ctx| ctx.write_status(200))])
        .unwrap_err();
    assert!(matches!(err, RegistrationError::DuplicateRoute { .. }));

    // Same pattern under a different method is fine.
    engine.post("/users", vec![handler_fn(|ctx| ctx.write_status(201))]).unwrap();
}

#[test]
fn renamed_param_with_same_shape_is_rejected() {
    let engine = Engine::new();
    engine.get("/users/:id", vec![handler_fn(|ctx| ctx.write_status(200))]).unwrap();
    let err = engine
        .get("/users/:name", vec![handler_fn(|ctx| ctx.write_status(200))])
        .unwrap_err();
    assert!(matches!(err, RegistrationError::ConflictingRoute { .. }));
}

#[test]
fn invalid_patterns_rejected() {
    let engine = Engine::new();
    let noop = || vec![handler_fn(|ctx| ctx.write_status(200))];

    for bad in ["/x/*rest/more", "/x/:", "/x/*", "/a//b", "/:id/:id"] {
        let err = engine.get(bad, noop()).unwrap_err();
        assert!(
            matches!(err, RegistrationError::InvalidPattern { .. }),
            "pattern {bad} gave {err:?}"
        );
    }
}

#[test]
fn empty_chain_rejected() {
    let engine = Engine::new();
    let err = engine.get("/users", vec![]).unwrap_err();
    assert!(matches!(err, RegistrationError::EmptyChain { .. }));
}

#[test]
fn chain_length_bound_enforced() {
    let engine = Engine::with_config(RouterConfig {
        max_chain_len: 2,
        ..RouterConfig::default()
    });
    let unit = || handler_fn(|ctx| ctx.next());
    let err = engine
        .get("/users", vec![unit(), unit(), unit()])
        .unwrap_err();
    assert!(matches!(err, RegistrationError::ChainTooLong { .. }));
}

#[test]
fn params_at_same_position_keep_their_own_names() {
    let engine = Engine::new();
    engine
        .get(
            "/users/:id/posts",
            vec![handler_fn(|ctx| {
                let id = ctx.param("id").to_string();
                ctx.string(200, &id);
            })],
        )
        .unwrap();
    engine
        .get(
            "/users/:name/profile",
            vec![handler_fn(|ctx| {
                let name = ctx.param("name").to_string();
                ctx.string(200, &name);
            })],
        )
        .unwrap();

    let (router, _) = engine.freeze();
    match router.resolve(&Method::GET, "/users/alice/profile") {
        RouteResolution::Matched(m) => {
            assert_eq!(m.params.len(), 1);
            assert_eq!(&*m.params[0].0, "name");
            assert_eq!(m.params[0].1, "alice");
        }
        other => panic!("no match: {other:?}"),
    }
}
