use crate::tools::CpuStatistics;
use console::style;

pub fn print_banner(title: &str) {
    let rule = "═".repeat(78);
    println!("{}", style(format!("╔{rule}╗")).cyan());
    println!("{}", style(format!("║ {title:<76} ║")).cyan().bold());
    println!("{}", style(format!("╚{rule}╝")).cyan());
    println!();
}

pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(80));
    println!("  {}", style(title).cyan().bold());
    println!("{}", "=".repeat(80));
}

pub fn print_cpu_statistics(stats: &CpuStatistics) {
    println!("CPU 使用率統計（{} 筆樣本）:", stats.sample_count);
    println!("  Average: {:.2}%", stats.average);
    println!("  Maximum: {:.2}%", stats.maximum);
    println!("  Minimum: {:.2}%", stats.minimum);
    println!();
}
