use http::Method;
use std::sync::{Arc, Mutex};
use trellis::context::{Context, RequestParts};
use trellis::group::ANY_METHODS;
use trellis::{handler_fn, Engine, Handler, RegistrationError, RouteResolution, Router};

type Log = Arc<Mutex<Vec<&'static str>>>;

fn marker(tag: &'static str, log: Log) -> Handler {
    handler_fn(move |ctx| {
        log.lock().unwrap().push(tag);
        ctx.next();
    })
}

fn dispatch(router: &Router, method: Method, path: &str) -> Option<Context> {
    match router.resolve(&method, path) {
        RouteResolution::Matched(m) => {
            let request = RequestParts {
                method,
                path: path.to_string(),
                ..Default::default()
            };
            let mut ctx = Context::new(request, m.params, m.chain, None);
            ctx.run();
            Some(ctx)
        }
        _ => None,
    }
}

#[test]
fn nested_groups_compose_paths() {
    let engine = Engine::new();
    let v1 = engine.group("/v1");
    let users = v1.group("/users");
    users
        .get(
            "/:id",
            vec![handler_fn(|ctx| {
                let id = ctx.param("id").to_string();
                ctx.string(200, &id);
            })],
        )
        .unwrap();

    let (router, _) = engine.freeze();
    let ctx = dispatch(&router, Method::GET, "/v1/users/7").unwrap();
    assert_eq!(ctx.response().body, b"7");
    assert!(dispatch(&router, Method::GET, "/users/7").is_none());
}

#[test]
fn group_middleware_applies_to_registered_routes() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let engine = Engine::new();
    let mut api = engine.group("/api");
    api.use_middleware(marker("api-mw", Arc::clone(&log)));
    api.get("/ping", vec![handler_fn(|ctx| ctx.string(200, "pong"))]).unwrap();

    let (router, _) = engine.freeze();
    dispatch(&router, Method::GET, "/api/ping").unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["api-mw"]);
}

#[test]
fn middleware_added_after_registration_does_not_apply_retroactively() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let engine = Engine::new();
    let mut api = engine.group("/api");
    api.get("/early", vec![handler_fn(|ctx| ctx.string(200, "early"))]).unwrap();
    api.use_middleware(marker("late-mw", Arc::clone(&log)));
    api.get("/late", vec![handler_fn(|ctx| ctx.string(200, "late"))]).unwrap();

    let (router, _) = engine.freeze();
    dispatch(&router, Method::GET, "/api/early").unwrap();
    assert!(log.lock().unwrap().is_empty());
    dispatch(&router, Method::GET, "/api/late").unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["late-mw"]);
}

#[test]
fn child_groups_inherit_parent_middleware() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let engine = Engine::new();
    let mut v1 = engine.group("/v1");
    v1.use_middleware(marker("v1-mw", Arc::clone(&log)));
    let mut users = v1.group("/users");
    users.use_middleware(marker("users-mw", Arc::clone(&log)));
    users.get("/list", vec![handler_fn(|ctx| ctx.string(200, "list"))]).unwrap();

    let (router, _) = engine.freeze();
    dispatch(&router, Method::GET, "/v1/users/list").unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["v1-mw", "users-mw"]);
}

#[test]
fn any_registers_all_standard_methods() {
    let engine = Engine::new();
    engine.any("/echo", vec![handler_fn(|ctx| {
        let m = ctx.method().to_string();
        ctx.string(200, &m);
    })]).unwrap();

    let (router, _) = engine.freeze();
    for method in ANY_METHODS {
        let ctx = dispatch(&router, method.clone(), "/echo")
            .unwrap_or_else(|| panic!("no match for {method}"));
        assert_eq!(ctx.response().body, method.as_str().as_bytes());
    }
}

#[test]
fn match_methods_registers_given_set_only() {
    let engine = Engine::new();
    engine
        .match_methods(
            &[Method::GET, Method::POST],
            "/thing",
            vec![handler_fn(|ctx| ctx.write_status(200))],
        )
        .unwrap();

    let (router, _) = engine.freeze();
    assert!(dispatch(&router, Method::GET, "/thing").is_some());
    assert!(dispatch(&router, Method::POST, "/thing").is_some());
    assert!(dispatch(&router, Method::DELETE, "/thing").is_none());
}

#[test]
fn static_routes_reject_pattern_markers() {
    let engine = Engine::new();
    let err = engine.static_file("/assets/:name", "index.html").unwrap_err();
    assert!(matches!(err, RegistrationError::StaticPathWithMarkers(_)));
    let err = engine.static_dir("/assets/*rest", "public").unwrap_err();
    assert!(matches!(err, RegistrationError::StaticPathWithMarkers(_)));
}

#[test]
fn duplicate_slashes_collapse_when_joining() {
    let engine = Engine::new();
    assert_eq!(engine.root().base_path(), "/");
    let g = engine.group("//v1");
    assert_eq!(g.base_path(), "/v1");
    g.get("//ping", vec![handler_fn(|ctx| ctx.write_status(200))]).unwrap();

    let (router, _) = engine.freeze();
    assert!(dispatch(&router, Method::GET, "/v1/ping").is_some());
}
