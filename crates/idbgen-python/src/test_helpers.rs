//! Shared fixtures for unit tests.
//!
//! `sample_snapshot()` describes a small interpreter: a handful of builtin
//! classes, one native function, and a `_demo` extension module that has a
//! native class with descriptors, a legacy class hierarchy, a self-referencing
//! class, a nested class and a non-text doc value.

use serde_json::{json, Value};

use crate::snapshot::SnapshotRuntime;

fn builtin_class(name: &str) -> Value {
    json!({
        "category": "class",
        "module": "builtins",
        "name": name,
        "mro": [name, "object"],
        "bases": ["object"]
    })
}

pub(crate) fn sample_snapshot() -> Value {
    let mut objects = json!({
        "object": {
            "category": "class",
            "module": "builtins",
            "name": "object",
            "doc": "The base class of the class hierarchy.",
            "mro": ["object"],
            "members": {
                "__new__": "object.__new__",
                "__init__": "object.__init__"
            }
        },
        "object.__new__": {
            "category": "builtin_function",
            "static": true,
            "doc": "Create and return a new object."
        },
        "object.__init__": {
            "category": "slot_wrapper",
            "doc": "Initialize self.  See help(type(self)) for accurate signature."
        },
        "str": {
            "category": "class",
            "module": "builtins",
            "name": "str",
            "doc": "str(object='') -> str",
            "mro": ["str", "object"],
            "bases": ["object"],
            "members": {
                "upper": "str.upper",
                "center": "str.center"
            }
        },
        "str.upper": {
            "category": "method_descriptor",
            "doc": "S.upper() -> str\n\nReturn a copy of S converted to uppercase."
        },
        "str.center": {
            "category": "method_descriptor",
            "doc": "S.center(width[, fillchar]) -> str"
        },
        "builtins.len": {
            "category": "builtin_function",
            "doc": "len(obj) -> int\n\nReturn the number of items in a container."
        },
        "builtins.None": {
            "category": "instance",
            "type": "NoneType"
        },
        "_demo.Point": {
            "category": "class",
            "module": "_demo",
            "name": "Point",
            "doc": "Point(x, y)",
            "mro": ["_demo.Point", "object"],
            "bases": ["object"],
            "members": {
                "x": "_demo.Point.x",
                "norm": "_demo.Point.norm",
                "origin": "_demo.Point.origin"
            }
        },
        "_demo.Point.x": {
            "category": "getset_descriptor",
            "doc": "x coordinate",
            "descriptor_type": "int"
        },
        "_demo.Point.norm": {
            "category": "method_descriptor",
            "doc": "norm($self, /)\n--\n\nEuclidean norm.",
            "signatures": [
                { "params": [{ "name": "self" }], "ret_type": ["builtins", "float"] }
            ]
        },
        "_demo.Point.origin": {
            "category": "class_method_descriptor",
            "static": true,
            "doc": "origin() -> _demo.Point"
        },
        "_demo.answer": {
            "category": "instance",
            "type": "int",
            "doc": 42
        },
        "_demo.helper": {
            "category": "builtin_function",
            "doc": "helper(*args, **kwargs) -> None"
        },
        "_demo.Node": {
            "category": "class",
            "module": "_demo",
            "name": "Node",
            "mro": ["_demo.Node", "object"],
            "bases": ["object"],
            "members": { "parent_type": "_demo.Node" }
        },
        "_demo.Outer": {
            "category": "class",
            "module": "_demo",
            "name": "Outer",
            "mro": ["_demo.Outer", "object"],
            "bases": ["object"],
            "members": { "Inner": "_demo.Inner" }
        },
        "_demo.Inner": {
            "category": "class",
            "module": "_demo",
            "name": "Inner",
            "mro": ["_demo.Inner", "object"],
            "bases": ["object"]
        },
        "_demo.Legacy": {
            "category": "legacy_class",
            "module": "_demo",
            "name": "Legacy",
            "bases": ["_demo.LegacyBase", "_demo.Mixin"]
        },
        "_demo.LegacyBase": {
            "category": "legacy_class",
            "module": "_demo",
            "name": "LegacyBase",
            "bases": ["_demo.Root"]
        },
        "_demo.Mixin": {
            "category": "legacy_class",
            "module": "_demo",
            "name": "Mixin",
            "bases": ["_demo.Root"]
        },
        "_demo.Root": {
            "category": "legacy_class",
            "module": "_demo",
            "name": "Root"
        }
    });

    for name in [
        "type",
        "int",
        "float",
        "function",
        "builtin_function_or_method",
        "method_descriptor",
        "generator",
        "NoneType",
        "ellipsis",
    ] {
        objects[name] = builtin_class(name);
    }

    json!({
        "builtin_modules": ["builtins", "_demo", "_missing", "__main__"],
        "well_known": {
            "root_object": "object",
            "function": "function",
            "builtin_function": "builtin_function_or_method",
            "builtin_method": "method_descriptor",
            "generator": "generator",
            "none": "NoneType",
            "ellipsis": "ellipsis"
        },
        "modules": {
            "builtins": {
                "doc": "Built-in functions, exceptions, and other objects.",
                "members": {
                    "object": "object",
                    "type": "type",
                    "int": "int",
                    "str": "str",
                    "len": "builtins.len",
                    "None": "builtins.None"
                }
            },
            "_demo": {
                "doc": "Demo extension module.",
                "members": {
                    "Point": "_demo.Point",
                    "Legacy": "_demo.Legacy",
                    "Node": "_demo.Node",
                    "Outer": "_demo.Outer",
                    "answer": "_demo.answer",
                    "helper": "_demo.helper"
                }
            },
            "__main__": {}
        },
        "objects": objects
    })
}

pub(crate) fn sample_runtime() -> SnapshotRuntime {
    match SnapshotRuntime::from_value(sample_snapshot()) {
        Ok(runtime) => runtime,
        Err(err) => panic!("sample snapshot is invalid: {err}"),
    }
}
