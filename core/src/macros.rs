/// Builds a [`Props`](crate::Props) record from `key => value` pairs.
///
/// Values go through `Into<Prop>`, so literals, strings, options and vectors
/// can be mixed freely. A leading `children => expr` entry fills the
/// children slot.
///
/// # Usage
///
/// ```
/// use patchui_core::{Node, props};
///
/// let props = props! {
///     children => Node::text("empty"),
///     "title" => "Inbox",
///     "unread" => 3,
/// };
///
/// assert_eq!(props.int("unread").unwrap(), 3);
/// assert!(props.children().is_some());
/// ```
#[macro_export]
macro_rules! props {
    (children => $children:expr $(, $key:literal => $value:expr)* $(,)?) => {
        $crate::props!($($key => $value),*).with_children($children)
    };

    ($($key:literal => $value:expr),* $(,)?) => {
        {
            #[allow(unused_mut)]
            let mut props = $crate::Props::new();
            $(
                props.insert($key, $value);
            )*
            props
        }
    };
}
