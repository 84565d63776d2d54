//! Comandos padrão do console.
//!
//! | Comando | Efeito |
//! |---------|--------|
//! | `help` | lista os comandos |
//! | `atoms [-v\|--verbose]` | lista os átomos |
//! | `create-atom <tipo> <nome...>` | cria um átomo |
//! | `processes` | lista os processos cognitivos |
//! | `status` | resumo da store e dos agentes |
//! | `stats` | estatísticas detalhadas |
//! | `clear` | esvazia a store |
//! | `save [chave]` / `load [chave]` | snapshot no armazenamento |
//! | `export` | imprime o snapshot JSON |
//! | `agents` | lista os agentes |
//! | `tasks` | lista as tarefas ativas |
//! | `task <descrição...>` | cria uma tarefa |
//! | `complete <taskId>` | conclui uma tarefa |
//! | `collabs` | lista as colaborações |

use std::fmt::Write as _;

use crate::agents::{TaskResult, DEFAULT_PRIORITY};
use crate::core::AtomType;
use crate::persistence::{load_store, save_store};
use crate::web::events::OrchestrationEvent;

use super::{Console, ConsoleError, Invocation};

/// Registra todos os comandos padrão, na ordem exibida pelo `help`.
pub fn register_defaults(console: &mut Console) {
    console.register("help", "Show available CogServer commands", |inv, out| {
        writeln!(out, "\n=== CogServer Commands ===\n")?;
        for (name, description) in inv.catalog {
            writeln!(out, "  {name:<20} - {description}")?;
        }
        writeln!(out)?;
        Ok(())
    });

    console.register("atoms", "List all atoms in AtomSpace (-v for details)", atoms);

    console.register("create-atom", "Create a new atom: create-atom <type> <name>", |inv, out| {
        if inv.args.len() < 2 {
            return Err(ConsoleError::Usage("create-atom <type> <name>"));
        }
        let atom_type: AtomType = inv.args[0].parse()?;
        let name = inv.args[1..].join(" ");
        let atom = inv
            .ctx
            .orchestrator
            .store()
            .write()
            .create_atom(atom_type, name, None, None);
        inv.ctx.autosave();
        writeln!(out, "\nCreated atom: [{}] {} ({})\n", atom.atom_type, atom.name, atom.id)?;
        Ok(())
    });

    console.register("processes", "List cognitive processes", |inv, out| {
        let store = inv.ctx.orchestrator.store().read();
        let processes = store.all_processes();
        writeln!(out, "\n=== Cognitive Processes ({}) ===\n", processes.len())?;
        for p in processes {
            writeln!(
                out,
                "  {} {} ({}) - {}% complete",
                p.status.icon(),
                p.name,
                p.kind.as_str(),
                p.progress
            )?;
        }
        writeln!(out)?;
        Ok(())
    });

    console.register("status", "Show CogServer status", |inv, out| {
        let stats = inv.ctx.orchestrator.store().read().statistics();
        let agents = inv.ctx.orchestrator.agent_stats();
        let active = inv.ctx.orchestrator.is_orchestration_active();
        writeln!(out, "\n=== CogServer Status ===\n")?;
        writeln!(out, "  AtomSpace: {} atoms", stats.total_atoms)?;
        writeln!(
            out,
            "  Processes: {} ({} active)",
            stats.total_processes, stats.active_process_count
        )?;
        writeln!(out, "  Agents: {}/{} active", agents.active_agents, agents.total_agents)?;
        writeln!(out, "  Tasks: {} total, {} pending", agents.total_tasks, agents.pending_tasks)?;
        writeln!(out, "  Orchestration: {}\n", if active { "running" } else { "stopped" })?;
        Ok(())
    });

    console.register("stats", "Show detailed AtomSpace statistics", |inv, out| {
        let stats = inv.ctx.orchestrator.store().read().statistics();
        writeln!(out, "\n=== AtomSpace Statistics ===\n")?;
        writeln!(out, "  Total Atoms: {}", stats.total_atoms)?;
        writeln!(out, "  Total Processes: {}", stats.total_processes)?;
        writeln!(out, "  Active Processes: {}", stats.active_process_count)?;
        writeln!(out, "  Files Mapped: {}", stats.files_mapped)?;
        writeln!(out, "  Average Truth Strength: {:.3}", stats.average_truth_strength)?;
        writeln!(out, "\nAtom Type Distribution:\n")?;
        for (atom_type, count) in &stats.per_type_counts {
            let pct = *count as f64 / stats.total_atoms as f64 * 100.0;
            writeln!(out, "  {:<20} {count:>5} ({pct:.1}%)", atom_type.as_str())?;
        }
        writeln!(out)?;
        Ok(())
    });

    console.register("clear", "Clear AtomSpace", |inv, out| {
        inv.ctx.orchestrator.store().write().clear();
        inv.ctx.orchestrator.publish(OrchestrationEvent::StoreReset);
        inv.ctx.autosave();
        writeln!(out, "\nAtomSpace cleared\n")?;
        Ok(())
    });

    console.register("save", "Save AtomSpace to storage: save [key]", |inv, out| {
        let key = key_from(inv);
        let store = inv.ctx.orchestrator.store();
        save_store(store, inv.ctx.storage.as_ref(), &key)?;
        let stats = store.read().statistics();
        writeln!(out, "\nAtomSpace saved (key: {key})")?;
        writeln!(
            out,
            "   Saved {} atoms and {} processes\n",
            stats.total_atoms, stats.total_processes
        )?;
        Ok(())
    });

    console.register("load", "Load AtomSpace from storage: load [key]", |inv, out| {
        let key = key_from(inv);
        let store = inv.ctx.orchestrator.store();
        if !load_store(store, inv.ctx.storage.as_ref(), &key)? {
            writeln!(out, "\nFailed to load AtomSpace from key: {key}\n")?;
            return Ok(());
        }
        let stats = store.read().statistics();
        inv.ctx.orchestrator.publish(OrchestrationEvent::SnapshotImported {
            atoms: stats.total_atoms,
            processes: stats.total_processes,
        });
        inv.ctx.autosave();
        writeln!(out, "\nAtomSpace loaded (key: {key})")?;
        writeln!(
            out,
            "   Loaded {} atoms and {} processes\n",
            stats.total_atoms, stats.total_processes
        )?;
        Ok(())
    });

    console.register("export", "Print the AtomSpace snapshot as JSON", |inv, out| {
        let payload = inv.ctx.orchestrator.store().read().export_snapshot()?;
        writeln!(out, "{payload}")?;
        Ok(())
    });

    console.register("agents", "List agents", |inv, out| {
        let agents = inv.ctx.orchestrator.agents();
        writeln!(out, "\n=== Agents ({}) ===\n", agents.len())?;
        for a in &agents {
            writeln!(
                out,
                "  [{}] {} ({}) - {} tasks, {:.0}% success",
                a.state,
                a.name,
                a.role,
                a.performance.tasks_completed,
                a.performance.success_rate * 100.0
            )?;
        }
        writeln!(out)?;
        Ok(())
    });

    console.register("tasks", "List active tasks", |inv, out| {
        let tasks = inv.ctx.orchestrator.active_tasks();
        writeln!(out, "\n=== Active Tasks ({}) ===\n", tasks.len())?;
        for t in &tasks {
            let owner = t.assigned_to.as_deref().unwrap_or("unassigned");
            writeln!(out, "  [{}] {} - {} -> {owner}", t.status, t.id, t.description)?;
        }
        writeln!(out)?;
        Ok(())
    });

    console.register("task", "Create a task: task <description>", |inv, out| {
        if inv.args.is_empty() {
            return Err(ConsoleError::Usage("task <description>"));
        }
        let task = inv
            .ctx
            .orchestrator
            .create_task(&inv.args.join(" "), DEFAULT_PRIORITY);
        match &task.assigned_to {
            Some(agent) => writeln!(out, "\nCreated task {} (assigned to {agent})\n", task.id)?,
            None => writeln!(out, "\nCreated task {} (pending)\n", task.id)?,
        }
        Ok(())
    });

    console.register("complete", "Complete a task: complete <taskId>", |inv, out| {
        let Some(task_id) = inv.args.first() else {
            return Err(ConsoleError::Usage("complete <taskId>"));
        };
        let result = TaskResult::Summary {
            success: true,
            summary: "completed from console".into(),
        };
        if inv.ctx.orchestrator.complete_task(task_id, Some(result)) {
            writeln!(out, "\nTask {task_id} completed\n")?;
        } else {
            writeln!(out, "\nTask {task_id} not completed (unknown or unassigned)\n")?;
        }
        Ok(())
    });

    console.register("collabs", "List collaborations", |inv, out| {
        let collabs = inv.ctx.orchestrator.collaborations();
        writeln!(out, "\n=== Collaborations ({}) ===\n", collabs.len())?;
        for c in &collabs {
            writeln!(
                out,
                "  [{}] {} - {} participants, {} messages",
                c.status.as_str(),
                c.goal,
                c.participants.len(),
                c.messages.len()
            )?;
        }
        writeln!(out)?;
        Ok(())
    });
}

fn atoms(inv: &Invocation<'_>, out: &mut dyn std::fmt::Write) -> Result<(), ConsoleError> {
    let verbose = matches!(inv.args.first().map(String::as_str), Some("-v" | "--verbose"));
    let store = inv.ctx.orchestrator.store().read();
    let atoms = store.all_atoms();
    writeln!(out, "\n=== AtomSpace ({} atoms) ===\n", atoms.len())?;
    for atom in atoms {
        if !verbose {
            writeln!(out, "  [{}] {}", atom.atom_type, atom.name)?;
            continue;
        }
        writeln!(out, "[{}] {} ({})", atom.atom_type, atom.name, atom.id)?;
        writeln!(
            out,
            "  TV: strength={:.2} confidence={:.2}",
            atom.truth_value.strength, atom.truth_value.confidence
        )?;
        if let Some(outgoing) = atom.outgoing.as_ref().filter(|o| !o.is_empty()) {
            writeln!(out, "  Outgoing: {}", outgoing.join(", "))?;
        }
    }
    writeln!(out)?;
    Ok(())
}

fn key_from(inv: &Invocation<'_>) -> String {
    if inv.args.is_empty() {
        inv.ctx.snapshot_key.clone()
    } else {
        inv.args.join("_")
    }
}
