pub mod dependency_tests;

use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;

use crate::kernel::error::{Error, Result};
use crate::module_system::{BootPriority, Module, ModuleType};

// --- Markers giving each Probe a distinct concrete type ---
pub struct A;
pub struct B;
pub struct C;
pub struct D;
pub struct X;
pub struct Y;
pub struct Z;

pub type EventLog = Arc<StdMutex<Vec<String>>>;

pub fn new_log() -> EventLog {
    Arc::new(StdMutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Key of `Probe<K>`
pub fn ty<K: 'static>() -> ModuleType {
    ModuleType::of::<Probe<K>>()
}

/// Configurable mock module recording its lifecycle calls in a shared log
pub struct Probe<K: 'static> {
    name: &'static str,
    priority: BootPriority,
    deps: Vec<ModuleType>,
    log: EventLog,
    init_calls: AtomicUsize,
    fail_init: bool,
    fail_stop: bool,
    _marker: PhantomData<fn() -> K>,
}

impl<K: 'static> Probe<K> {
    pub fn new(name: &'static str, priority: BootPriority, log: &EventLog) -> Self {
        Self {
            name,
            priority,
            deps: Vec::new(),
            log: log.clone(),
            init_calls: AtomicUsize::new(0),
            fail_init: false,
            fail_stop: false,
            _marker: PhantomData,
        }
    }

    pub fn depends_on(mut self, dependency: ModuleType) -> Self {
        self.deps.push(dependency);
        self
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<K: 'static> Module for Probe<K> {
    fn name(&self) -> &str {
        self.name
    }

    fn boot_priority(&self) -> BootPriority {
        self.priority
    }

    fn dependencies(&self) -> Vec<ModuleType> {
        self.deps.clone()
    }

    async fn initialize(&self) -> Result<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_init {
            return Err(Error::Other(format!("{} refused to start", self.name)));
        }
        self.log.lock().unwrap().push(format!("init:{}", self.name));
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.log.lock().unwrap().push(format!("stop:{}", self.name));
        if self.fail_stop {
            return Err(Error::Other(format!("{} refused to stop", self.name)));
        }
        Ok(())
    }
}

/// Capability implemented by more than one test module
pub trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

/// `Greeter` provider that only loads on demand
pub struct GreeterModule {
    greeting: &'static str,
    priority: BootPriority,
    log: EventLog,
}

impl GreeterModule {
    pub fn new(greeting: &'static str, log: &EventLog) -> Self {
        Self::with_priority(greeting, BootPriority::None, log)
    }

    pub fn with_priority(greeting: &'static str, priority: BootPriority, log: &EventLog) -> Self {
        Self {
            greeting,
            priority,
            log: log.clone(),
        }
    }
}

impl Greeter for GreeterModule {
    fn greet(&self) -> String {
        self.greeting.to_string()
    }
}

#[async_trait]
impl Module for GreeterModule {
    fn name(&self) -> &str {
        "Greeter"
    }

    fn boot_priority(&self) -> BootPriority {
        self.priority
    }

    async fn initialize(&self) -> Result<()> {
        self.log.lock().unwrap().push("init:Greeter".to_string());
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        Ok(())
    }
}

/// Second `Greeter` provider, used to show first-registration-wins lookup
pub struct ShoutingGreeter;

impl Greeter for ShoutingGreeter {
    fn greet(&self) -> String {
        "HELLO".to_string()
    }
}

#[async_trait]
impl Module for ShoutingGreeter {
    fn name(&self) -> &str {
        "ShoutingGreeter"
    }

    fn boot_priority(&self) -> BootPriority {
        BootPriority::None
    }

    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        Ok(())
    }
}
