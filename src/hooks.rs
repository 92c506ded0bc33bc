//! Hook registry for the runner's lifecycle extension points.
//!
//! Hooks are registered per extension point, either for every transaction
//! (`before_each`, `before_each_validation`, `after_each`) or for one
//! transaction selected by its exact scenario name (`before`,
//! `before_validation`, `after`). The registry then dispatches each runner
//! event to the matching lists in a fixed order.

use {
    crate::{
        filters::{ExpectedBodyNormalizer, RealBodyNormalizer, SessionCapture, SessionInjection},
        session::HookContext,
        transaction::Transaction,
    },
    std::{collections::HashMap, sync::Arc},
};

/// A hook that runs against a single transaction.
pub trait TransactionHook: Send + Sync {
    fn run(&self, transaction: &mut Transaction, context: &mut HookContext);
}

impl<F> TransactionHook for F
where
    F: Fn(&mut Transaction, &mut HookContext) + Send + Sync,
{
    fn run(&self, transaction: &mut Transaction, context: &mut HookContext) {
        self(transaction, context)
    }
}

/// A hook that runs once against the whole transaction list (`beforeAll`/`afterAll`).
pub type BatchHook = Arc<dyn Fn(&mut [Transaction], &mut HookContext) + Send + Sync>;

type HookList = Vec<Arc<dyn TransactionHook>>;

/// Registered hooks for every extension point.
#[derive(Default, Clone)]
pub struct HookRegistry {
    before_all: Vec<BatchHook>,
    before_each: HookList,
    before: HashMap<String, HookList>,
    before_each_validation: HookList,
    before_validation: HashMap<String, HookList>,
    after: HashMap<String, HookList>,
    after_each: HookList,
    after_all: Vec<BatchHook>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry carrying a session from `init_transaction` to every later
    /// request, with XML body normalization on both sides of the comparison.
    ///
    /// ```rust
    /// use session_hooks::HookRegistry;
    ///
    /// let hooks = HookRegistry::session_carrying(
    ///     "REST API after init > Initialize > Initialize from XML topology",
    /// );
    /// assert_eq!(hooks.hook_count(), 4);
    /// ```
    pub fn session_carrying(init_transaction: &str) -> Self {
        Self::new()
            .with_session_capture(init_transaction)
            .before_each(SessionInjection)
            .before_each(ExpectedBodyNormalizer)
            .before_each_validation(RealBodyNormalizer)
    }

    /// Also capture the session cookie after `init_transaction`.
    pub fn with_session_capture(self, init_transaction: &str) -> Self {
        self.after(init_transaction, SessionCapture)
    }

    pub fn before_all<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut [Transaction], &mut HookContext) + Send + Sync + 'static,
    {
        self.before_all.push(Arc::new(hook));
        self
    }

    pub fn before_each(mut self, hook: impl TransactionHook + 'static) -> Self {
        self.before_each.push(Arc::new(hook));
        self
    }

    pub fn before(mut self, name: &str, hook: impl TransactionHook + 'static) -> Self {
        self.before.entry(name.to_string()).or_default().push(Arc::new(hook));
        self
    }

    pub fn before_each_validation(mut self, hook: impl TransactionHook + 'static) -> Self {
        self.before_each_validation.push(Arc::new(hook));
        self
    }

    pub fn before_validation(mut self, name: &str, hook: impl TransactionHook + 'static) -> Self {
        self.before_validation
            .entry(name.to_string())
            .or_default()
            .push(Arc::new(hook));
        self
    }

    pub fn after(mut self, name: &str, hook: impl TransactionHook + 'static) -> Self {
        self.after.entry(name.to_string()).or_default().push(Arc::new(hook));
        self
    }

    pub fn after_each(mut self, hook: impl TransactionHook + 'static) -> Self {
        self.after_each.push(Arc::new(hook));
        self
    }

    pub fn after_all<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut [Transaction], &mut HookContext) + Send + Sync + 'static,
    {
        self.after_all.push(Arc::new(hook));
        self
    }

    /// Total number of registered hooks across all extension points.
    pub fn hook_count(&self) -> usize {
        let named = |map: &HashMap<String, HookList>| map.values().map(Vec::len).sum::<usize>();
        self.before_all.len()
            + self.before_each.len()
            + named(&self.before)
            + self.before_each_validation.len()
            + named(&self.before_validation)
            + named(&self.after)
            + self.after_each.len()
            + self.after_all.len()
    }

    pub fn run_before_all(&self, transactions: &mut [Transaction], context: &mut HookContext) {
        for hook in &self.before_all {
            hook(transactions, context);
        }
    }

    /// `before_each` hooks, then the `before` hooks named after the transaction.
    pub fn run_before_each(&self, transaction: &mut Transaction, context: &mut HookContext) {
        run_list(&self.before_each, transaction, context);
        run_named(&self.before, transaction, context);
    }

    /// `before_each_validation` hooks, then the named `before_validation` hooks.
    pub fn run_before_each_validation(
        &self,
        transaction: &mut Transaction,
        context: &mut HookContext,
    ) {
        run_list(&self.before_each_validation, transaction, context);
        run_named(&self.before_validation, transaction, context);
    }

    /// Named `after` hooks, then the `after_each` hooks.
    pub fn run_after_each(&self, transaction: &mut Transaction, context: &mut HookContext) {
        run_named(&self.after, transaction, context);
        run_list(&self.after_each, transaction, context);
    }

    pub fn run_after_all(&self, transactions: &mut [Transaction], context: &mut HookContext) {
        for hook in &self.after_all {
            hook(transactions, context);
        }
    }
}

fn run_list(hooks: &HookList, transaction: &mut Transaction, context: &mut HookContext) {
    for hook in hooks {
        hook.run(transaction, context);
    }
}

fn run_named(
    hooks: &HashMap<String, HookList>,
    transaction: &mut Transaction,
    context: &mut HookContext,
) {
    // Scenario names match exactly; a name with no hooks is the common case.
    if let Some(list) = hooks.get(transaction.name()) {
        run_list(list, transaction, context);
    }
}
