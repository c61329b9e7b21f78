//! Collisions involving `use` and `extern crate` bindings.

mod common;
use common::*;

#[test]
fn import_collides_with_later_item() {
    check_errors(
        r#"
mod inner {
    pub struct foo1 {}
    pub fn foo2() {}
}
use inner::foo1;
struct <error descr="The name `foo1` is defined multiple times [E0255]">foo1</error> {}
use inner::foo2;
fn <error descr="The name `foo2` is defined multiple times [E0255]">foo2</error>() {}
"#,
        vec![
            Item::module(
                "inner",
                [
                    Item::structure("foo1").public(),
                    Item::function("foo2").public(),
                ],
            ),
            Item::use_item(UseTree::simple("inner::foo1")),
            Item::structure("foo1"),
            Item::use_item(UseTree::simple("inner::foo2")),
            Item::function("foo2"),
        ],
    );
}

#[test]
fn item_collides_with_later_import() {
    check_errors(
        r#"
mod inner { pub fn f() {} }
fn f() {}
use inner::<error descr="The name `f` is defined multiple times [E0255]">f</error>;
"#,
        vec![
            Item::module("inner", [Item::function("f").public()]),
            Item::function("f"),
            Item::use_item(UseTree::simple("inner::f")),
        ],
    );
}

#[test]
fn two_imports_of_one_name() {
    check_errors(
        r#"
mod a { pub struct S; }
mod b { pub struct S; }
use a::S;
use b::<error descr="The name `S` is defined multiple times [E0252]">S</error>;
"#,
        vec![
            Item::module("a", [Item::structure("S").public()]),
            Item::module("b", [Item::structure("S").public()]),
            Item::use_item(UseTree::simple("a::S")),
            Item::use_item(UseTree::simple("b::S")),
        ],
    );
}

#[test]
fn imports_in_one_group_collide() {
    check_errors(
        r#"
mod a { pub struct S; pub mod b { pub struct S; } }
use a::{S, b::<error descr="The name `S` is defined multiple times [E0252]">S</error>};
"#,
        vec![
            Item::module(
                "a",
                [
                    Item::structure("S").public(),
                    Item::module("b", [Item::structure("S").public()]).public(),
                ],
            ),
            Item::use_item(UseTree::group(
                "a",
                [UseTree::simple("S"), UseTree::simple("b::S")],
            )),
        ],
    );
}

#[test]
fn imports_only_bind_visible_namespaces() {
    check_no_errors(
        r#"
mod mod1 {
    fn foo() {}
    pub struct foo {}
}
mod mod2 {
    pub fn foo() {}
}
use mod1::foo;
use mod2::foo;
"#,
        vec![
            Item::module(
                "mod1",
                [Item::function("foo"), Item::structure("foo").public()],
            ),
            Item::module("mod2", [Item::function("foo").public()]),
            Item::use_item(UseTree::simple("mod1::foo")),
            Item::use_item(UseTree::simple("mod2::foo")),
        ],
    );
}

#[test]
fn unresolved_imports_never_collide() {
    check_no_errors(
        r#"
use bar::unresolved;
use baz::unresolved;
"#,
        vec![
            Item::use_item(UseTree::simple("bar::unresolved")),
            Item::use_item(UseTree::simple("baz::unresolved")),
        ],
    );
}

#[test]
fn aliased_import_binds_the_alias() {
    check_no_errors(
        r#"
mod m { pub struct Arc; }
use m::Arc as A;
struct Arc {}
"#,
        vec![
            Item::module("m", [Item::structure("Arc").public()]),
            Item::use_item(UseTree::alias("m::Arc", "A")),
            Item::structure("Arc"),
        ],
    );
}

#[test]
fn underscore_imports_never_collide() {
    check_no_errors(
        r#"
mod m { pub trait T {} }
use m::T as _;
use m::T as _;
"#,
        vec![
            Item::module("m", [Item::trait_def("T", []).public()]),
            Item::use_item(UseTree::alias("m::T", "_")),
            Item::use_item(UseTree::alias("m::T", "_")),
        ],
    );
}

#[test]
fn import_after_extern_crate() {
    check_errors(
        r#"
mod inner {
    pub struct foo1 {}
    pub fn foo2() {}
}
extern crate std as foo1;
use inner::<error descr="The name `foo1` is defined multiple times [E0254]">foo1</error>;
extern crate std as foo2;
use inner::foo2;
"#,
        vec![
            Item::module(
                "inner",
                [
                    Item::structure("foo1").public(),
                    Item::function("foo2").public(),
                ],
            ),
            Item::extern_crate("std", Some("foo1")),
            Item::use_item(UseTree::simple("inner::foo1")),
            Item::extern_crate("std", Some("foo2")),
            Item::use_item(UseTree::simple("inner::foo2")),
        ],
    );
}

#[test]
fn item_after_extern_crate() {
    check_errors(
        r#"
extern crate std as foo1;
struct <error descr="The name `foo1` is defined multiple times [E0260]">foo1</error> {}
extern crate std as foo2;
fn foo2() {}
"#,
        vec![
            Item::extern_crate("std", Some("foo1")),
            Item::structure("foo1"),
            Item::extern_crate("std", Some("foo2")),
            Item::function("foo2"),
        ],
    );
}

#[test]
fn extern_crate_after_item_covers_the_whole_item() {
    check_errors(
        r#"
struct bar {}
<error descr="The name `bar` is defined multiple times [E0260]">extern crate std as bar;</error>
"#,
        vec![
            Item::structure("bar"),
            Item::extern_crate("std", Some("bar")),
        ],
    );
}

#[test]
fn two_extern_crates_of_one_name() {
    check_errors(
        r#"
extern crate std;
<error descr="The name `std` is defined multiple times [E0259]">extern crate core as std;</error>
"#,
        vec![
            Item::extern_crate("std", None),
            Item::extern_crate("core", Some("std")),
        ],
    );
}

#[test]
fn repeated_self_import() {
    check_errors(
        r#"
use foo::{self, <error descr="The `self` import appears more than once in the list [E0430]">self</error>};
use bar::{self};
use baz::{self as baz1, self as baz2};
"#,
        vec![
            Item::use_item(UseTree::group(
                "foo",
                [UseTree::simple("self"), UseTree::simple("self")],
            )),
            Item::use_item(UseTree::group("bar", [UseTree::simple("self")])),
            Item::use_item(UseTree::group(
                "baz",
                [
                    UseTree::alias("self", "baz1"),
                    UseTree::alias("self", "baz2"),
                ],
            )),
        ],
    );
}

#[test]
fn self_import_binds_the_module_name() {
    check_errors(
        r#"
mod inner { pub mod m {} }
mod m {}
use inner::m::{<error descr="The name `m` is defined multiple times [E0255]">self</error>};
"#,
        vec![
            Item::module("inner", [Item::module("m", []).public()]),
            Item::module("m", []),
            Item::use_item(UseTree::group("inner::m", [UseTree::simple("self")])),
        ],
    );
}

#[test]
fn imports_inside_blocks() {
    check_errors(
        r#"
mod m { pub fn g() {} }
fn main() {
    use m::g;
    fn <error descr="The name `g` is defined multiple times [E0255]">g</error>() {}
}
"#,
        vec![
            Item::module("m", [Item::function("g").public()]),
            Item::function("main").body([
                Stmt::item(Item::use_item(UseTree::simple("m::g"))),
                Stmt::item(Item::function("g")),
            ]),
        ],
    );
}

#[test]
fn underscore_extern_crates_never_clash() {
    check_no_errors(
        r#"
extern crate alloc as _;
extern crate core as _;
"#,
        vec![
            Item::extern_crate("alloc", Some("_")),
            Item::extern_crate("core", Some("_")),
        ],
    );
}

#[test]
fn super_inside_a_body_module_reaches_the_local_parent() {
    check_no_errors(
        r#"
mod m { pub fn x() {} }
fn main() {
    mod m {
        pub struct x {}
        mod n { use super::x; fn x() {} }
    }
}
"#,
        vec![
            Item::module("m", [Item::function("x").public()]),
            Item::function("main").body([Stmt::item(Item::module(
                "m",
                [
                    Item::structure("x").public(),
                    Item::module(
                        "n",
                        [
                            Item::use_item(UseTree::simple("super::x")),
                            Item::function("x"),
                        ],
                    ),
                ],
            ))]),
        ],
    );
    check_errors(
        r#"
mod m { pub fn x() {} }
fn main() {
    mod m {
        pub struct x {}
        mod n { use super::x; struct <error descr="The name `x` is defined multiple times [E0255]">x</error>; }
    }
}
"#,
        vec![
            Item::module("m", [Item::function("x").public()]),
            Item::function("main").body([Stmt::item(Item::module(
                "m",
                [
                    Item::structure("x").public(),
                    Item::module(
                        "n",
                        [
                            Item::use_item(UseTree::simple("super::x")),
                            Item::structure("x"),
                        ],
                    ),
                ],
            ))]),
        ],
    );
}
