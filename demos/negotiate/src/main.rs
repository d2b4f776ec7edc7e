//! コンテントネゴシエーションの例
//!
//! 使い方:
//!   cargo run -p negotiate -- "text/html;q=0.5, application/json" -p text/html -p application/json
//!   cargo run -p negotiate -- --kind language "en-US, fr;q=0.8" -p fr -p en
//!   cargo run -p negotiate -- --ordered "gzip;q=0.5, br, identity;q=0"

use shiguredo_negotiation::{HeaderElement, HeaderKind, NegotiationError, Negotiator};

struct Options {
    kind: HeaderKind,
    strict: bool,
    ordered: bool,
    header: String,
    priorities: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options = parse_args()?;
    let negotiator = Negotiator::new(options.kind);

    if options.ordered {
        let elements = negotiator.ordered_elements(&options.header)?;
        for element in &elements {
            print_element(element);
        }
        return Ok(());
    }

    match negotiator.negotiate(&options.header, &options.priorities, options.strict) {
        Ok(best) => {
            print_element(&best);
            Ok(())
        }
        Err(NegotiationError::NoAcceptableMatch) => {
            // HTTP サーバーであれば 406 Not Acceptable を返す場面
            eprintln!(
                "no acceptable {} for {}: {}",
                options.kind,
                options.kind.header_name(),
                options.header
            );
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("negotiation error: {}", e);
            std::process::exit(2);
        }
    }
}

fn parse_args() -> Result<Options, Box<dyn std::error::Error>> {
    let mut args = noargs::raw_args();
    args.metadata_mut().app_name = "negotiate";

    // --help フラグ
    noargs::HELP_FLAG.take_help(&mut args);

    // --version フラグ
    let version_flag: bool = noargs::flag("version")
        .short('V')
        .doc("Show version")
        .take(&mut args)
        .is_present();
    if version_flag {
        println!("{}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    // --kind オプション
    let kind: HeaderKind = noargs::opt("kind")
        .short('k')
        .doc("Header kind: media, language, charset or encoding (default: media)")
        .default("media")
        .take(&mut args)
        .then(|o| parse_kind(o.value()))
        .map_err(|e| format!("{:?}", e))?;

    // --strict フラグ
    let strict: bool = noargs::flag("strict")
        .doc("Fail on malformed elements instead of skipping them")
        .take(&mut args)
        .is_present();

    // --ordered フラグ
    let ordered: bool = noargs::flag("ordered")
        .doc("Print the header elements ordered by quality")
        .take(&mut args)
        .is_present();

    // --priority オプション (複数指定可、指定順が優先順)
    let mut priorities = Vec::new();
    loop {
        let priority: Option<String> = noargs::opt("priority")
            .short('p')
            .doc("Offered value, in server preference order (repeatable)")
            .take(&mut args)
            .present_and_then(|o| Ok::<_, &str>(o.value().to_string()))
            .map_err(|e| format!("{:?}", e))?;
        match priority {
            Some(priority) => priorities.push(priority),
            None => break,
        }
    }

    // 位置引数: ヘッダー値
    let header: String = noargs::arg("<HEADER>")
        .doc("Accept header value (e.g., \"text/html, */*;q=0.1\")")
        .take(&mut args)
        .then(|a| Ok::<_, &str>(a.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    // 未知の引数があればエラー、ヘルプが返されたら表示
    if let Some(help) = args.finish().map_err(|e| format!("{:?}", e))? {
        print!("{}", help);
        std::process::exit(0);
    }

    Ok(Options {
        kind,
        strict,
        ordered,
        header,
        priorities,
    })
}

fn parse_kind(value: &str) -> Result<HeaderKind, String> {
    match value.to_ascii_lowercase().as_str() {
        "media" | "accept" => Ok(HeaderKind::Media),
        "language" | "accept-language" => Ok(HeaderKind::Language),
        "charset" | "accept-charset" => Ok(HeaderKind::Charset),
        "encoding" | "accept-encoding" => Ok(HeaderKind::Encoding),
        other => Err(format!("unknown header kind: {}", other)),
    }
}

fn print_element(element: &HeaderElement) {
    println!("{}\tq={}", element.normalized_value(), element.qvalue());
}
