//! A module-like collection of targets that can be scanned by capability.
//!
//! Every member provides its own type. Registering it with
//! [`Export::implements`] additionally lets it be produced as another type,
//! typically a boxed trait object shared by a family of alternatives:
//!
//! ```
//! use selector_core::{Namespace, Signature, Target};
//!
//! trait Shape {
//!     fn area(&self) -> f64;
//! }
//! struct Square(f64);
//! impl Shape for Square {
//!     fn area(&self) -> f64 {
//!         self.0 * self.0
//!     }
//! }
//!
//! let square = Target::new("Square", Signature::new().param::<f64>("side"), |args| {
//!     Ok(Square(args.get("side")?))
//! });
//! let mut shapes = Namespace::new("shapes");
//! shapes
//!     .add(square)
//!     .implements(|s| Box::new(s) as Box<dyn Shape>);
//!
//! assert_eq!(shapes.candidates::<Box<dyn Shape>>().len(), 1);
//! ```

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};

use crate::target::Target;

#[derive(Default)]
struct Member {
    provides: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

#[derive(Default)]
pub struct Namespace {
    name: String,
    members: BTreeMap<String, Member>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Namespace {
            name: name.into(),
            members: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds `target` under its own name, replacing any member of that name.
    pub fn add<T: 'static>(&mut self, target: Target<T>) -> Export<'_, T> {
        let member = self.members.entry(target.name().to_string()).or_default();
        member.provides.clear();
        member
            .provides
            .insert(TypeId::of::<T>(), Box::new(target.clone()));
        Export { member, target }
    }

    /// The members that can be produced as `C`, ordered by member name.
    pub fn candidates<C: 'static>(&self) -> Vec<Target<C>> {
        self.members
            .values()
            .filter_map(|member| member.provides.get(&TypeId::of::<C>()))
            .filter_map(|provided| provided.downcast_ref::<Target<C>>())
            .cloned()
            .collect()
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Declares the capabilities of a freshly added member.
pub struct Export<'a, T> {
    member: &'a mut Member,
    target: Target<T>,
}

impl<T: 'static> Export<'_, T> {
    pub fn implements<C, F>(self, upcast: F) -> Self
    where
        C: 'static,
        F: Fn(T) -> C + Send + Sync + 'static,
    {
        let provided = self.target.clone().map(upcast);
        self.member
            .provides
            .insert(TypeId::of::<C>(), Box::new(provided));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Signature;
    use crate::target::Arguments;

    trait Greeter {
        fn greet(&self) -> String;
    }

    struct Hello;
    impl Greeter for Hello {
        fn greet(&self) -> String {
            "hello".into()
        }
    }

    struct Bonjour;
    impl Greeter for Bonjour {
        fn greet(&self) -> String {
            "bonjour".into()
        }
    }

    fn greeters() -> Namespace {
        let mut namespace = Namespace::new("greeters");
        namespace
            .add(Target::new("Hello", Signature::new(), |_| Ok(Hello)))
            .implements(|g| Box::new(g) as Box<dyn Greeter>);
        namespace
            .add(Target::new("Bonjour", Signature::new(), |_| Ok(Bonjour)))
            .implements(|g| Box::new(g) as Box<dyn Greeter>);
        namespace.add(Target::new("answer", Signature::new(), |_| Ok(42u8)));
        namespace
    }

    #[test]
    fn test_candidates_by_capability_in_name_order() {
        let namespace = greeters();
        let candidates = namespace.candidates::<Box<dyn Greeter>>();
        let names: Vec<_> = candidates.iter().map(|t| t.name()).collect();
        assert_eq!(names, ["Bonjour", "Hello"]);
        let greeting = candidates[1].call(&Arguments::new()).unwrap().greet();
        assert_eq!(greeting, "hello");
    }

    #[test]
    fn test_members_provide_their_own_type() {
        let namespace = greeters();
        assert_eq!(namespace.candidates::<u8>().len(), 1);
        assert_eq!(namespace.candidates::<Hello>().len(), 1);
        assert!(namespace.candidates::<String>().is_empty());
        assert_eq!(namespace.len(), 3);
    }

    #[test]
    fn test_re_adding_replaces_member() {
        let mut namespace = greeters();
        namespace.add(Target::new("Hello", Signature::new(), |_| Ok(Hello)));
        assert_eq!(namespace.candidates::<Box<dyn Greeter>>().len(), 1);
        assert_eq!(namespace.len(), 3);
    }
}
