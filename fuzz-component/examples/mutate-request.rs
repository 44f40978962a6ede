use fuzz_component::{components, Request};
use http::Method;

const PAYLOAD: &str = "'\"><svg/onload=alert(1)>";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fuzz_component=debug".parse()?),
        )
        .init();

    let request = Request::new(Method::POST, "http://target.example/search?q=shoes&page=1")?
        .with_header("User-Agent", "mutate-request/0.1")?
        .with_header("Cookie", "session=0123abcd")?
        .with_header("Content-Type", "application/json")?
        .with_body(r#"{"filter":"red","limit":10}"#);

    for mut component in components() {
        if !component.parse(&request)? {
            println!("# {}: nothing to fuzz", component.name());
            continue;
        }

        let mut keys = Vec::new();
        component.iterate(&mut |key, _| {
            keys.push(key.to_string());
            Ok(())
        })?;

        for key in keys {
            component.parse(&request)?;
            component.set_value(&key, PAYLOAD)?;
            match component.rebuild() {
                Ok(mutated) => println!("# {} {}\n{}\n", component.name(), key, mutated),
                Err(e) => eprintln!("# {} {}: {}", component.name(), key, e),
            }
        }
    }
    Ok(())
}
