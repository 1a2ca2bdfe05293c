// ==========================================
// 印刷生产日报系统 - 引擎层
// ==========================================
// 职责: 班次分配、运行速度、日报装配
// 红线: 引擎只读网格，不做 I/O
// ==========================================

pub mod report_assembler;
pub mod run_speed;
pub mod shift_assignment;

// 重导出核心引擎
pub use report_assembler::ReportAssembler;
pub use run_speed::{NetRunSpeed, RunSpeedFormula};
pub use shift_assignment::{overlap_minutes, ClockInterval, ShiftAssignment, ShiftAssignmentEngine};
