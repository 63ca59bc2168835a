//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - Bell-state sampling on IBM Quantum hardware",
        style("quistik").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  quistik-ir           Circuit intermediate representation");
    println!("  quistik-compile      Transpiler passes and targets");
    println!("  quistik-qasm3        OpenQASM 3 emitter");
    println!("  quistik-hal          Hardware abstraction layer");
    println!("  quistik-adapter-ibm  IBM Quantum Platform and Sampler V2");
    println!("  quistik-cli          Command-line interface");
    println!();
    println!("License:    {}", style(env!("CARGO_PKG_LICENSE")).dim());
}
