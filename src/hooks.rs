//! Typed, named hook chains.
//!
//! A hook point is a zero-sized marker type naming a (handler, hook) pair and
//! the context its callbacks see. Callbacks run in registration order; one
//! returning `ControlFlow::Break(out)` stops the chain and hands `out` back to
//! the handler that executed it.

use crate::logic::Logic;
use once_cell::sync::Lazy;
use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

pub trait HookPoint: 'static {
    type Ctx: 'static;
    type Out: 'static;
    const HANDLER: &'static str;
    const NAME: &'static str;
}

/// Declares a hook point marker type.
macro_rules! hook_point {
    ($(#[$meta:meta])* $name:ident: $handler:literal / $hook:literal, $ctx:ty => $out:ty) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug)]
        pub struct $name;

        impl $crate::hooks::HookPoint for $name {
            type Ctx = $ctx;
            type Out = $out;
            const HANDLER: &'static str = $handler;
            const NAME: &'static str = $hook;
        }
    };
}
pub(crate) use hook_point;

pub type HookCallback<P> = dyn Fn(&mut Logic, &mut <P as HookPoint>::Ctx) -> ControlFlow<<P as HookPoint>::Out>
    + Send
    + Sync;

pub struct Registration<P: HookPoint> {
    pub reason: Cow<'static, str>,
    callback: Box<HookCallback<P>>,
}

impl<P: HookPoint> fmt::Debug for Registration<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("handler", &P::HANDLER)
            .field("hook", &P::NAME)
            .field("reason", &self.reason)
            .finish()
    }
}

#[derive(Default)]
pub struct HookRegistry {
    chains: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a callback to the chain of `P`.
    pub fn register<P, F>(&mut self, reason: impl Into<Cow<'static, str>>, callback: F)
    where
        P: HookPoint,
        F: Fn(&mut Logic, &mut P::Ctx) -> ControlFlow<P::Out> + Send + Sync + 'static,
    {
        let chain = self
            .chains
            .entry(TypeId::of::<P>())
            .or_insert_with(|| Box::new(Vec::<Registration<P>>::new()));
        let Some(chain) = chain.downcast_mut::<Vec<Registration<P>>>() else {
            unreachable!("hook chain for {}/{} stored with a foreign type", P::HANDLER, P::NAME);
        };
        chain.push(Registration {
            reason: reason.into(),
            callback: Box::new(callback),
        });
    }

    pub fn chain<P: HookPoint>(&self) -> &[Registration<P>] {
        self.chains
            .get(&TypeId::of::<P>())
            .and_then(|chain| chain.downcast_ref::<Vec<Registration<P>>>())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Reasons of the chain of `P`, in execution order.
    pub fn reasons<P: HookPoint>(&self) -> Vec<&str> {
        self.chain::<P>().iter().map(|r| r.reason.as_ref()).collect()
    }

    pub fn freeze(self) -> Arc<HookRegistry> {
        Arc::new(self)
    }
}

/// Registry holding the built-in rule pack, shared by every battle.
pub static DEFAULT_HOOKS: Lazy<Arc<HookRegistry>> =
    Lazy::new(|| crate::rules::default_registry().freeze());

pub fn default_hooks() -> Arc<HookRegistry> {
    Arc::clone(&DEFAULT_HOOKS)
}

/// Runs the chain of `P`; the first `Break` wins.
pub fn exec_hooks<P: HookPoint>(logic: &mut Logic, ctx: &mut P::Ctx) -> ControlFlow<P::Out> {
    let hooks = Arc::clone(logic.hooks());
    for registration in hooks.chain::<P>() {
        if let ControlFlow::Break(out) = (registration.callback)(logic, ctx) {
            tracing::debug!(
                handler = P::HANDLER,
                hook = P::NAME,
                reason = %registration.reason,
                "hook short-circuited"
            );
            return ControlFlow::Break(out);
        }
    }
    ControlFlow::Continue(())
}

/// Deferred explanation of a refusal, usually a message to display.
pub struct Reason(Box<dyn FnOnce(&mut Logic)>);

impl Reason {
    pub fn new(play: impl FnOnce(&mut Logic) + 'static) -> Self {
        Self(Box::new(play))
    }

    pub fn message(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |logic| logic.display_message(&text))
    }

    pub fn play(self, logic: &mut Logic) {
        (self.0)(logic)
    }
}

impl fmt::Debug for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Reason(..)")
    }
}

/// Outcome of a refused check. The reason is played at most once.
#[derive(Debug, Default)]
pub struct Prevented {
    pub reason: Option<Reason>,
}

impl Prevented {
    pub fn silent() -> Self {
        Self { reason: None }
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self {
            reason: Some(Reason::message(text)),
        }
    }

    pub fn with(play: impl FnOnce(&mut Logic) + 'static) -> Self {
        Self {
            reason: Some(Reason::new(play)),
        }
    }

    pub fn play(self, logic: &mut Logic) {
        if let Some(reason) = self.reason {
            reason.play(logic);
        }
    }
}

/// Shorthand for a veto from inside a prevention callback.
pub fn veto<T>(text: impl Into<String>) -> ControlFlow<Prevented, T> {
    ControlFlow::Break(Prevented::message(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    hook_point!(Probe: "test" / "probe", Vec<&'static str> => u8);

    #[test]
    fn registration_order_is_preserved() {
        let mut registry = HookRegistry::new();
        registry.register::<Probe, _>("first", |_, _| ControlFlow::Continue(()));
        registry.register::<Probe, _>("second", |_, _| ControlFlow::Break(2));
        assert_eq!(registry.reasons::<Probe>(), vec!["first", "second"]);
    }

    #[test]
    fn empty_chain_is_empty_slice() {
        let registry = HookRegistry::new();
        assert!(registry.chain::<Probe>().is_empty());
    }
}
