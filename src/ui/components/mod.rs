mod command_input;
mod input;
mod key_result;
mod notices;
mod search_input;
mod table_controls;

pub use command_input::{CommandEvent, CommandInput};
pub use input::{InputResult, TextInput};
pub use key_result::KeyResult;
pub use notices::{Notice, NoticeSender, Notices};
pub use search_input::{SearchEvent, SearchInput};
pub use table_controls::{SortColumn, TableControls};
