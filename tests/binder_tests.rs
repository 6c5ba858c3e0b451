//! Integration tests for instance creation, method binding and invocation.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use quickc::{
    BindError, CallError, DataType, InvokeError, LoadedModule, MAX_CALL_DEPTH, MethodSignature,
    RuntimeError, Value, compile,
};

fn load_script(filename: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_scripts")
        .join(filename);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}

fn build_script(filename: &str) -> LoadedModule {
    compile(&load_script(filename), None).unwrap_or_else(|e| panic!("{filename}: {e}"))
}

/// An output sink tests can read back.
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// =============================================================================
// End to end
// =============================================================================

#[test]
fn greeter_says_hello() {
    let module = compile(
        "class Greeter { public string Greet(string name) => \"Hello, \" + name; }",
        None,
    )
    .unwrap();
    let greeter = module.create_instance("Greeter").unwrap();
    let greet = greeter.bind::<(String,), String>("Greet").unwrap();
    assert_eq!(greet.invoke(("World".to_string(),)).unwrap(), "Hello, World");
}

#[test]
fn all_four_call_shapes() {
    let module = build_script("greeter.cs");
    let greeter = module.create_instance("Samples.Greeter").unwrap();

    let set = greeter.bind::<(String,), ()>("SetGreeting").unwrap();
    set.invoke(("Hi".to_string(),)).unwrap();
    let greet = greeter.bind::<(String,), String>("Greet").unwrap();
    assert_eq!(greet.invoke(("there".to_string(),)).unwrap(), "Hi, there");

    let counter_module = build_script("counter.cs");
    let counter = counter_module.create_instance("Samples.Counter").unwrap();
    counter.bind::<(), ()>("Increment").unwrap().invoke(()).unwrap();
    assert_eq!(counter.bind::<(), i32>("Get").unwrap().invoke(()).unwrap(), 1);
}

#[test]
fn wider_arities_and_conversions() {
    let module = build_script("counter.cs");
    let counter = module.create_instance("Samples.Counter").unwrap();
    let sum = counter.bind::<(i32, i32, i32, i32), i32>("Sum").unwrap();
    assert_eq!(sum.invoke((1, 2, 3, 4)).unwrap(), 10);
    assert_eq!(counter.func::<(i32,), i64>("Widen", (7,)).unwrap(), 7);
    assert_eq!(counter.func::<(i32,), f64>("Half", (3,)).unwrap(), 1.5);
    assert!(counter.func::<(i32,), bool>("IsEven", (4,)).unwrap());
}

// =============================================================================
// Instance state
// =============================================================================

#[test]
fn fields_persist_per_instance() {
    let module = build_script("counter.cs");
    let first = module.create_instance("Samples.Counter").unwrap();
    let second = module.create_instance("Samples.Counter").unwrap();

    let increment = first.bind::<(), ()>("Increment").unwrap();
    increment.invoke(()).unwrap();
    increment.invoke(()).unwrap();

    assert_eq!(first.func::<(), i32>("Get", ()).unwrap(), 2);
    assert_eq!(second.func::<(), i32>("Get", ()).unwrap(), 0);
    assert_eq!(first.field_value("count"), Some(Value::Int(2)));

    first.action("Reset", ()).unwrap();
    assert_eq!(first.func::<(), i32>("Get", ()).unwrap(), 0);
}

#[test]
fn static_fields_are_shared_by_the_module() {
    let module = build_script("counter.cs");
    let first = module.create_instance("Samples.Counter").unwrap();
    let _second = module.create_instance("Samples.Counter").unwrap();
    assert_eq!(first.func::<(), i32>("Created", ()).unwrap(), 2);
}

#[test]
fn field_initializers_run_on_construction() {
    let module = build_script("greeter.cs");
    let greeter = module.create_instance("Samples.Greeter").unwrap();
    assert_eq!(greeter.field_value("greeting"), Some(Value::from("Hello")));
    assert_eq!(greeter.field_value("missing"), None);
}

// =============================================================================
// Binding failures
// =============================================================================

#[test]
fn unknown_type_is_not_found() {
    let module = build_script("counter.cs");
    let err = module.create_instance("Nonexistent.Type").unwrap_err();
    assert!(matches!(err, BindError::TypeNotFound { type_name, .. } if type_name == "Nonexistent.Type"));
}

#[test]
fn internal_types_are_still_found() {
    let module = build_script("counter.cs");
    let hidden = module.create_instance("Samples.Hidden").unwrap();
    assert_eq!(hidden.func::<(), i32>("Value", ()).unwrap(), 7);
}

#[test]
fn constructors_must_be_parameterless() {
    let module = build_script("counter.cs");
    for type_name in ["Samples.NeedsArguments", "Samples.Helpers"] {
        let err = module.create_instance(type_name).unwrap_err();
        assert!(
            matches!(&err, BindError::ConstructionFailure { cause: None, .. }),
            "{type_name}: {err}"
        );
    }
}

#[test]
fn wrong_signatures_are_not_found() {
    let module = build_script("counter.cs");
    let counter = module.create_instance("Samples.Counter").unwrap();

    let err = counter.bind::<(String,), i32>("IsEven").err().unwrap();
    assert_eq!(
        err,
        BindError::MethodNotFound {
            type_name: "Samples.Counter".to_string(),
            signature: "int IsEven(string)".to_string(),
        }
    );
    assert!(counter.bind::<(i32,), i32>("IsEven").is_err());
    assert!(counter.bind::<(), i32>("Nothing").is_err());
}

#[test]
fn private_and_static_methods_are_not_bindable() {
    let module = build_script("counter.cs");
    let counter = module.create_instance("Samples.Counter").unwrap();
    assert!(matches!(
        counter.bind::<(), i32>("Secret"),
        Err(BindError::MethodNotFound { .. })
    ));
    assert!(matches!(
        counter.bind::<(i32,), i32>("Twice"),
        Err(BindError::MethodNotFound { .. })
    ));
    assert!(matches!(
        counter.action(".ctor", ()),
        Err(CallError::Bind(BindError::MethodNotFound { .. }))
    ));
}

// =============================================================================
// Descriptor binding
// =============================================================================

#[test]
fn dynamic_calls_check_arguments() {
    let module = build_script("counter.cs");
    let counter = module.create_instance("Samples.Counter").unwrap();
    let signature = MethodSignature::new([DataType::Int], DataType::Bool);
    let is_even = counter.bind_dynamic("IsEven", signature).unwrap();

    assert_eq!(is_even.invoke(&[Value::Int(3)]).unwrap(), Value::Bool(false));
    assert!(matches!(
        is_even.invoke(&[Value::from("3")]),
        Err(InvokeError::ArgumentMismatch { .. })
    ));
    assert!(matches!(
        is_even.invoke(&[]),
        Err(InvokeError::ArgumentMismatch { .. })
    ));
}

// =============================================================================
// Runtime behavior
// =============================================================================

#[test]
fn control_flow() {
    let module = build_script("control_flow.cs");
    let loops = module.create_instance("Loops").unwrap();
    assert_eq!(loops.func::<(i32,), i32>("SumTo", (10,)).unwrap(), 55);
    assert_eq!(loops.func::<(i32,), i32>("Fib", (15,)).unwrap(), 610);
    assert_eq!(loops.func::<(i32,), String>("Classify", (-3,)).unwrap(), "negative");
    assert_eq!(loops.func::<(i32,), String>("Classify", (0,)).unwrap(), "zero");
    assert_eq!(loops.func::<(i32,), String>("Classify", (9,)).unwrap(), "positive");
    assert_eq!(loops.func::<(i32, i32), i32>("FirstMultiple", (7, 100)).unwrap(), 7);
    assert_eq!(loops.func::<(i32,), i32>("CountDown", (5,)).unwrap(), 5);
    assert!(loops.func::<(bool, bool), bool>("Both", (false, false)).unwrap());
    assert!(!loops.func::<(bool, bool), bool>("Both", (true, false)).unwrap());
}

#[test]
fn runtime_overflow_is_checked() {
    let module = build_script("library.cs");
    let text = module.create_instance("Tools.Text").unwrap();
    let overflow = text.bind::<(i32,), i32>("Overflow").unwrap();
    assert_eq!(overflow.invoke((0,)).unwrap(), i32::MAX);
    assert_eq!(
        overflow.invoke((1,)),
        Err(InvokeError::Runtime(RuntimeError::Overflow))
    );
    assert_eq!(
        text.func::<(i32, i32), i32>("Divide", (1, 0)),
        Err(CallError::Invoke(InvokeError::Runtime(RuntimeError::DivideByZero)))
    );
}

#[test]
fn unbounded_recursion_hits_the_depth_limit() {
    let module = build_script("control_flow.cs");
    let loops = module.create_instance("Loops").unwrap();
    assert_eq!(
        loops.func::<(i32,), i32>("Forever", (0,)),
        Err(CallError::Invoke(InvokeError::Runtime(RuntimeError::CallDepthExceeded {
            limit: MAX_CALL_DEPTH
        })))
    );
}

#[test]
fn library_calls() {
    let module = build_script("library.cs");
    let text = module.create_instance("Tools.Text").unwrap();
    let s = |v: &str| (v.to_string(),);

    assert_eq!(
        text.func::<(String, String), String>("Join", ("dir".into(), "file.txt".into())).unwrap(),
        "dir/file.txt"
    );
    assert_eq!(text.func::<(String,), String>("Extension", s("a/b.tar.gz")).unwrap(), ".gz");
    assert!(text.func::<(String,), bool>("IsNumber", s("12345")).unwrap());
    assert!(!text.func::<(String,), bool>("IsNumber", s("12a45")).unwrap());
    assert_eq!(text.func::<(String,), String>("Shout", s("hey")).unwrap(), "HEY!");
    assert_eq!(text.func::<(String, String), i32>("Longest", ("ab".into(), "abcd".into())).unwrap(), 4);
    assert_eq!(text.func::<(String,), String>("Encode", s("a b")).unwrap(), "a+b");
    assert_eq!(text.func::<(String,), String>("Reversed", s("abc")).unwrap(), "cba");
    assert_eq!(text.func::<(String,), i32>("Parse", s("-12")).unwrap(), -12);
}

#[test]
fn native_failures_surface_as_runtime_errors() {
    let module = build_script("library.cs");
    let text = module.create_instance("Tools.Text").unwrap();
    let result = text.func::<(String,), bool>("BadPattern", ("x".to_string(),));
    assert!(matches!(
        result,
        Err(CallError::Invoke(InvokeError::Runtime(RuntimeError::Native { function, .. })))
            if function == "System.Text.RegularExpressions.Regex.IsMatch"
    ));
    let result = text.func::<(String,), i32>("Parse", ("twelve".to_string(),));
    assert!(matches!(
        result,
        Err(CallError::Invoke(InvokeError::Runtime(RuntimeError::Native { .. })))
    ));
}

#[test]
fn console_output_goes_to_the_module_sink() {
    let buffer = SharedBuffer::default();
    let module = build_script("library.cs").with_output(buffer.clone());
    let text = module.create_instance("Tools.Text").unwrap();
    text.action("Print", ("Hello World".to_string(),)).unwrap();
    assert_eq!(buffer.contents(), "Hello World\n");
}

#[test]
fn modules_are_shareable_across_threads() {
    let module = Arc::new(build_script("counter.cs"));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let module = Arc::clone(&module);
            std::thread::spawn(move || {
                let counter = module.create_instance("Samples.Counter").unwrap();
                counter.func::<(i32, i32, i32, i32), i32>("Sum", (i, i, i, i)).unwrap()
            })
        })
        .collect();
    let sums: Vec<i32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(sums, [0, 4, 8, 12]);
}
