use std::fmt;

use tracing::error;

pub type Res<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub fn next_value<T>(it: &mut std::slice::Iter<'_, std::string::String>, opt: &str) -> T
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    let n = it
        .next()
        .unwrap_or_else(|| error_exit(format!("{}: value missing", opt)));
    n.parse()
        .unwrap_or_else(|e| error_exit(format!("{}: {} '{}'", opt, e, n)))
}

pub fn prompt() -> Option<String> {
    use std::io::{stdin, stdout, Write};
    print!("> ");
    stdout().flush().ok();
    let mut buf = String::new();
    match stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None, // EOF
        Ok(_) => Some(buf),
    }
}

pub fn error_exit<T: fmt::Display, U>(t: T) -> U {
    error!("{}", t);
    std::process::exit(1);
}

// 最初に一致した要素を削除 (見つからない場合は何もしない)
pub fn vec_remove_first<T: PartialEq>(v: &mut Vec<T>, e: &T) -> bool {
    if let Some(i) = v.iter().position(|x| x == e) {
        v.remove(i);
        true
    } else {
        false
    }
}

pub fn vec_count<T: PartialEq>(v: &[T], e: &T) -> usize {
    v.iter().filter(|&n| n == e).count()
}

pub fn vec_to_string<T: fmt::Display>(v: &[T]) -> String {
    let vs: Vec<String> = v.iter().map(|x| format!("{}", x)).collect();
    "[".to_string() + &vs.join(", ") + "]"
}

#[test]
fn test_vec_remove_first() {
    let mut v = vec![1, 2, 3, 2];
    assert!(vec_remove_first(&mut v, &2));
    assert_eq!(v, vec![1, 3, 2]);
    assert!(!vec_remove_first(&mut v, &9));
    assert_eq!(v, vec![1, 3, 2]);
}

#[test]
fn test_vec_to_string() {
    assert_eq!(vec_to_string(&[1, 2, 3]), "[1, 2, 3]");
    assert_eq!(vec_to_string::<i32>(&[]), "[]");
    assert_eq!(vec_count(&[1, 2, 1], &1), 2);
}
