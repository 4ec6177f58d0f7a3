//! A [`cxxhdr::Visitor`] that prints declaration events as they stream in,
//! demonstrating the streaming alternative to the built `Ast` (spec §4.4,
//! §2 item 6) from the CLI's `--visit` flag.

use colored::Colorize;
use cxxhdr::ast::{Declaration, Enumerator, FunctionDecl, VariableDecl};
use cxxhdr::Visitor;

#[derive(Default)]
pub struct PrintVisitor {
    depth: usize,
}

impl PrintVisitor {
    fn indent(&self) -> String {
        "  ".repeat(self.depth)
    }
}

impl Visitor for PrintVisitor {
    fn enter_namespace(&mut self, name: Option<&str>) {
        println!("{}{} {}", self.indent(), "namespace".cyan(), name.unwrap_or("<anonymous>"));
        self.depth += 1;
    }

    fn exit_namespace(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn enter_class(&mut self, name: Option<&str>) {
        println!("{}{} {}", self.indent(), "class".cyan(), name.unwrap_or("<anonymous>"));
        self.depth += 1;
    }

    fn exit_class(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn on_function(&mut self, decl: &FunctionDecl) {
        println!(
            "{}{} {}",
            self.indent(),
            "fn".green(),
            decl.name.last_identifier().unwrap_or("<unnamed>")
        );
    }

    fn on_variable(&mut self, decl: &VariableDecl) {
        println!("{}{} {}", self.indent(), "var".green(), decl.name);
    }

    fn on_typedef(&mut self, decl: &Declaration) {
        let name = match decl {
            Declaration::Typedef { name, .. } | Declaration::Using { name, .. } => name.as_str(),
            _ => "<?>",
        };
        println!("{}{} {}", self.indent(), "typedef".yellow(), name);
    }

    fn on_using(&mut self, _decl: &Declaration) {
        println!("{}{}", self.indent(), "using".yellow());
    }

    fn on_friend(&mut self, _decl: &Declaration) {
        println!("{}{}", self.indent(), "friend".magenta());
    }

    fn on_enum(&mut self, name: Option<&str>, enumerators: &[Enumerator]) {
        println!(
            "{}{} {} ({} enumerator(s))",
            self.indent(),
            "enum".cyan(),
            name.unwrap_or("<anonymous>"),
            enumerators.len()
        );
    }

    fn on_static_assert(&mut self, _decl: &Declaration) {
        println!("{}{}", self.indent(), "static_assert".red());
    }

    fn on_pragma(&mut self, raw: &str) {
        println!("{}{} {}", self.indent(), "#".blue(), raw);
    }
}
