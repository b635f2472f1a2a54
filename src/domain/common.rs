/// Supplies a short presentation label for prompts and logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}
