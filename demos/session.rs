//! # Example: one instrumentation session
//!
//! A toy engine acknowledges requests right away and reports the resulting
//! transitions from its own thread, the way a real agent connection would.
//! Script output is printed through the session console.

use std::{sync::Arc, thread, time::Duration};

use async_trait::async_trait;
use tracevisor::{
    Command, CommandDispatcher, Config, ConsoleWriter, Engine, EngineError, EngineId,
    EngineListener, EngineListeners, ListenerId, TaskController, TaskId, TaskState,
};

/// Engine reporting every transition from a background thread.
struct ThreadedEngine {
    id: EngineId,
    listeners: Arc<EngineListeners>,
}

impl ThreadedEngine {
    fn report(&self, task: TaskId, f: fn(&EngineListeners, &TaskId)) {
        let listeners = Arc::clone(&self.listeners);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            f(&listeners, &task);
        });
    }
}

#[async_trait]
impl Engine for ThreadedEngine {
    fn id(&self) -> EngineId {
        self.id
    }

    async fn start(&self, task: &TaskController) -> Result<(), EngineError> {
        task.set_instrumented_classes(3);
        self.listeners.notify_instrumenting(&task.id());
        self.report(task.id(), EngineListeners::notify_start);
        Ok(())
    }

    async fn stop(&self, task: &TaskController) -> Result<(), EngineError> {
        self.report(task.id(), EngineListeners::notify_stop);
        Ok(())
    }

    async fn send_event(
        &self,
        task: &TaskController,
        event: Option<&str>,
    ) -> Result<(), EngineError> {
        let text = format!("event {} handled\n", event.unwrap_or("<anonymous>"));
        task.dispatch_command(Command::message(text))
            .map_err(|e| EngineError::Failed {
                error: e.to_string(),
            })
    }

    fn add_listener(&self, listener: Arc<dyn EngineListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.remove(id);
    }
}

async fn wait_for(session: &TaskController, state: TaskState) {
    while session.state() != state {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let engine = Arc::new(ThreadedEngine {
        id: EngineId::next(),
        listeners: Arc::new(EngineListeners::new()),
    });
    let dispatcher = CommandDispatcher::new(&Config::default());

    let session = TaskController::builder(4242, engine, dispatcher.handle())
        .with_script(
            r#"@BTrace(name = "probe")
public class Probe {
    @OnEvent("dump") public static void dump() {}
}"#,
        )
        .build();

    let id = session.id();
    session.add_state_listener(Arc::new(move |state: TaskState| {
        println!("[state] {id} -> {state}");
    }));
    session.add_command_listener(Arc::new(ConsoleWriter::new(session.output())));

    println!(
        "[script] name={:?} events={:?}",
        session.name(),
        session.named_events()
    );

    session.start().await?;
    println!("[classes] {:?}", session.instrumented_classes());
    wait_for(&session, TaskState::Running).await;

    for event in session.named_events() {
        session.send_event(&event).await?;
    }
    session.dispatch_command(Command::Exit(0))?;

    session.stop().await?;
    wait_for(&session, TaskState::Finished).await;

    dispatcher.shutdown().await;
    Ok(())
}
