/// Builds a [`Value`](crate::Value) from literal syntax.
///
/// Objects become dictionaries, arrays become lists, and anything else goes
/// through `Value::from`.
///
/// ```rust
/// use serde_bencode::{bencode, to_string};
///
/// let torrent = bencode!({
///     "announce": "http://tracker.example/announce",
///     "info": { "length": 1024, "name": "file.txt" }
/// });
/// assert_eq!(
///     to_string(&torrent).unwrap(),
///     "d8:announce31:http://tracker.example/announce4:infod6:lengthi1024e4:name8:file.txtee"
/// );
/// ```
#[macro_export]
macro_rules! bencode {
    ([]) => {
        $crate::Value::List(::std::vec::Vec::new())
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::List(vec![$($crate::bencode!($elem)),*])
    };

    ({}) => {
        $crate::Value::Dict($crate::Dict::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut dict = $crate::Dict::new();
        $(
            dict.insert($key, $crate::bencode!($value));
        )*
        $crate::Value::Dict(dict)
    }};

    ($other:expr) => {
        $crate::Value::from($other)
    };
}
