extern crate rand;
extern crate simpson_core;

use rand::prelude::*;
use simpson_core::{compile, integrate, normalize};

struct RecursiveCtx {
    pub depth: u32,
    pub inside_trigo: bool,
    pub inside_exp: u32,
    pub inside_bars: u32,
}

fn random_num(ctx: &RecursiveCtx) -> String {
    let mut rng = thread_rng();
    match rng.gen_range(0, 10) {
        0 => "0".to_string(),
        1 => "1".to_string(),
        2 => format!("{}.{}", rng.gen_range(0, 10), rng.gen_range(0, 100)),
        x => {
            // If we're in a trigonometry function, we don't want enormous
            // numbers.
            if !ctx.inside_trigo && x == 9 {
                return rng.gen_range(0, 100_000).to_string();
            }
            // If we're in a exponential function, we really don't want big
            // numbers.
            if ctx.inside_exp > 0 {
                return rng.gen_range(0, 4).to_string();
            }
            rng.gen_range(0, 100).to_string()
        }
    }
}

fn random_leaf(ctx: &RecursiveCtx) -> String {
    const NAMES: [&str; 5] = ["x", "X", "pi", "e", "x"];
    let mut rng = thread_rng();
    if rng.gen() {
        random_num(ctx)
    } else {
        NAMES.choose(&mut rng).map_or("x", |name| *name).to_string()
    }
}

fn random_func() -> &'static str {
    const FUNCS: [&str; 14] = [
        "sin", "cos", "tan", "sec", "csc", "cot", "asin", "acos", "atan", "exp", "log", "ln",
        "sqrt", "abs",
    ];
    FUNCS.choose(&mut thread_rng()).map_or("sin", |name| *name)
}

fn random_space() -> &'static str {
    if thread_rng().gen_range(0, 4) == 0 {
        " "
    } else {
        ""
    }
}

fn random_node(ctx: RecursiveCtx) -> String {
    let mut rng = thread_rng();
    // limit the amount of node depth
    if ctx.depth < 4 && rng.gen_range(0, 10) > 2 {
        // pick a composite node
        let s = random_space();
        match rng.gen_range(0, 9) {
            0 => {
                let op = ["+", "-", "*", "/"].choose(&mut rng).map_or("+", |op| *op);
                return format!(
                    "({}{}{}{}{})",
                    random_node(ctx.deeper()),
                    s,
                    op,
                    s,
                    random_node(ctx.deeper())
                );
            }
            1 if ctx.inside_exp < 2 => {
                let op = if rng.gen() { "^" } else { "**" };
                return format!(
                    "({}){}{}{}",
                    random_node(ctx.for_exp_call()),
                    s,
                    op,
                    rng.gen_range(0, 4)
                );
            }
            2 => return format!("-{}", random_node(ctx.deeper())),
            3 => {
                let func = random_func();
                let ctx = if func == "exp" {
                    ctx.for_exp_call()
                } else {
                    ctx.for_trigo_call()
                };
                return format!("{}({})", func, random_node(ctx));
            }
            4 => return format!("|{}|", random_node(ctx.for_bars())),
            // implicit multiplication by a coefficient
            5 => return format!("{}{}({})", random_num(&ctx), s, random_node(ctx.deeper())),
            6 => return format!("{}x", random_num(&ctx)),
            7 => return format!("({})({})", random_node(ctx.deeper()), random_node(ctx.deeper())),
            // a bar right after an operand is only unambiguous outside of bars
            8 if ctx.inside_bars == 0 => {
                return format!("x|{}|", random_node(ctx.for_bars()));
            }
            _ => {}
        }
    }
    random_leaf(&ctx)
}

impl RecursiveCtx {
    fn new() -> Self {
        Self {
            depth: 0,
            inside_trigo: false,
            inside_exp: 0,
            inside_bars: 0,
        }
    }

    fn deeper(&self) -> Self {
        Self {
            depth: self.depth + 1,
            inside_trigo: self.inside_trigo,
            inside_exp: self.inside_exp,
            inside_bars: self.inside_bars,
        }
    }

    fn for_trigo_call(&self) -> Self {
        Self {
            inside_trigo: true,
            ..self.deeper()
        }
    }

    fn for_exp_call(&self) -> Self {
        Self {
            inside_exp: self.inside_exp + 1,
            ..self.deeper()
        }
    }

    fn for_bars(&self) -> Self {
        Self {
            inside_bars: self.inside_bars + 1,
            ..self.deeper()
        }
    }
}

fn main() {
    for i in 0..5000 {
        let raw = random_node(RecursiveCtx::new());

        if i != 0 {
            println!();
        }
        println!("Testing {}:\n", raw);

        let normalized = match normalize(&raw) {
            Ok(val) => val,
            Err(err) => panic!("cannot normalize {:?}: {}", raw, err),
        };
        println!("- normalized: {}", normalized);
        assert_eq!(normalize(&normalized).as_ref(), Ok(&normalized));

        let expr = match compile(&normalized) {
            Ok(val) => val,
            Err(err) => panic!("cannot compile {:?}: {}", normalized, err),
        };
        println!("- compiled: {}", expr);

        let forward = integrate(|x| expr.eval(x), 0.1, 1.9, 10);
        let backward = integrate(|x| expr.eval(x), 1.9, 0.1, 10);
        match (forward, backward) {
            (Ok(forward), Ok(backward)) => {
                println!("- integral: {}", forward);

                let mut is_equal = false;
                is_equal |= (forward + backward).abs() < 1e-6;
                if forward != 0.0 {
                    is_equal |= ((forward + backward) / forward).abs() < 1e-6;
                }
                assert!(is_equal);
            }
            (Err(err), _) | (_, Err(err)) => println!("- integral: ({})", err),
        }
    }
}
