//! Compile a class at runtime and call into it.
//!
//! ```bash
//! cargo run --example writer
//! ```

use quickc::compile;

fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let source = r#"
        using System;

        namespace Demo
        {
            public class Writer
            {
                private int written;

                public void Write(string message)
                {
                    Console.WriteLine(message);
                    written++;
                }

                public int Written() => written;
            }
        }
    "#;

    let module = match compile(source, None) {
        Ok(module) => module,
        Err(err) => {
            eprintln!("{err}");
            if let Some(diagnostics) = err.diagnostics() {
                eprintln!("{diagnostics}");
            }
            std::process::exit(1);
        }
    };

    let writer = module
        .create_instance("Demo.Writer")
        .expect("Failed to create Demo.Writer");
    let write = writer
        .bind::<(String,), ()>("Write")
        .expect("Failed to bind Write");
    write
        .invoke(("Hello World".to_string(),))
        .expect("Failed to invoke Write");

    let written: i32 = writer
        .func("Written", ())
        .expect("Failed to call Written");
    println!("{} wrote {written} message(s)", module.name());
}
