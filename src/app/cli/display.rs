//! Terminal output: live statistics line and the final summary table

use crate::core::styles::StyleRole;
use crate::notifications::api::StatisticsEvent;
use crate::pipeline::api::{ConsumerStatistics, ProducerStatistics};
use crate::queue::QueueStatistics;
use chrono::Local;
use prettytable::{format, Cell, Row, Table};
use std::collections::BTreeMap;

/// Latest statistics seen on the notification stream
#[derive(Debug, Default)]
pub struct LiveView {
    producers: BTreeMap<String, ProducerStatistics>,
    consumers: BTreeMap<String, ConsumerStatistics>,
    queue: QueueStatistics,
    color: bool,
}

impl LiveView {
    pub fn new(color: bool) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn apply(&mut self, event: StatisticsEvent) {
        match event {
            StatisticsEvent::Producer(stats) => {
                self.producers.insert(stats.id.clone(), stats);
            }
            StatisticsEvent::Consumer(stats) => {
                self.consumers.insert(stats.id.clone(), stats);
            }
            StatisticsEvent::Queue(stats) => self.queue = stats,
        }
    }

    /// Nothing worth printing until the first producer update arrives
    pub fn has_workers(&self) -> bool {
        !self.producers.is_empty() || !self.consumers.is_empty()
    }

    /// One line describing the current state of the run
    pub fn status_line(&self) -> String {
        let produced: u64 = self.producers.values().map(|p| p.total_produced).sum();
        let producing = self.producers.values().filter(|p| p.is_active).count();
        let consumed: u64 = self.consumers.values().map(|c| c.total_consumed).sum();
        let consuming = self.consumers.values().filter(|c| c.is_active).count();

        let over_limit =
            self.queue.max_size > 0 && self.queue.current_size > self.queue.max_size;
        let queue_role = if over_limit {
            StyleRole::Warning
        } else {
            StyleRole::Queue
        };

        format!(
            "{} {} | {} | {}",
            StyleRole::Dim.paint(&Local::now().format("%H:%M:%S").to_string(), self.color),
            StyleRole::Producer.paint(
                &format!("produced {produced} ({producing} active)"),
                self.color
            ),
            StyleRole::Consumer.paint(
                &format!("consumed {consumed} ({consuming} active)"),
                self.color
            ),
            queue_role.paint(
                &format!(
                    "queue {}/{} (wait {:.0?})",
                    self.queue.current_size, self.queue.max_size, self.queue.average_wait_time
                ),
                self.color
            ),
        )
    }
}

fn styled_cell(text: &str, role: StyleRole, color: bool) -> Cell {
    let cell = Cell::new(text);
    match role.to_prettytable_spec() {
        Some(spec) if color => cell.style_spec(spec),
        _ => cell,
    }
}

/// Per-worker totals followed by the queue row
pub fn summary_table(
    producers: &[ProducerStatistics],
    consumers: &[ConsumerStatistics],
    queue: &QueueStatistics,
    color: bool,
) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(Row::new(
        ["Worker", "State", "Items", "Items/s"]
            .iter()
            .map(|title| styled_cell(title, StyleRole::Header, color))
            .collect(),
    ));

    for producer in producers {
        table.add_row(Row::new(vec![
            styled_cell(&producer.id, StyleRole::Producer, color),
            Cell::new(&producer.state.to_string()),
            Cell::new(&producer.total_produced.to_string()),
            Cell::new(&format!("{:.2}", producer.items_per_second())),
        ]));
    }
    for consumer in consumers {
        table.add_row(Row::new(vec![
            styled_cell(&consumer.id, StyleRole::Consumer, color),
            Cell::new(&consumer.state.to_string()),
            Cell::new(&consumer.total_consumed.to_string()),
            Cell::new(&format!("{:.2}", consumer.items_per_second())),
        ]));
    }

    table.add_row(Row::new(vec![
        styled_cell("Queue", StyleRole::Queue, color),
        Cell::new(&format!("{} left", queue.current_size)),
        Cell::new(&format!(
            "{} in / {} out",
            queue.total_enqueued, queue.total_dequeued
        )),
        Cell::new(&format!("wait {:.0?}", queue.average_wait_time)),
    ]));
    table
}

/// Check `produced == consumed + queued` and describe the outcome
pub fn conservation_line(
    produced: u64,
    consumed: u64,
    queued: usize,
    color: bool,
) -> (bool, String) {
    let holds = produced == consumed + queued as u64;
    let text = format!("{produced} produced = {consumed} consumed + {queued} queued");
    let line = if holds {
        StyleRole::Good.paint(&format!("Conservation OK: {text}"), color)
    } else {
        StyleRole::Bad.paint(&format!("Conservation MISMATCH: {text}"), color)
    };
    (holds, line)
}
