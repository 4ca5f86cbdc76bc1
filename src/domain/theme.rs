// Theme bundles: semantic color classes keyed by a short name
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Palette {
    pub primary: &'static str,
    pub accent: &'static str,
    pub background: &'static str,
    pub surface: &'static str,
    pub text: &'static str,
    pub muted: &'static str,
    pub success: &'static str,
    pub warning: &'static str,
    pub danger: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Theme {
    pub key: &'static str,
    pub name: &'static str,
    pub palette: Palette,
}

pub const DEFAULT_THEME: &str = "light";

pub fn builtin_themes() -> Vec<Theme> {
    vec![
        Theme {
            key: "light",
            name: "Light",
            palette: Palette {
                primary: "bg-blue-600",
                accent: "text-indigo-500",
                background: "bg-gray-50",
                surface: "bg-white",
                text: "text-gray-900",
                muted: "text-gray-500",
                success: "text-green-600",
                warning: "text-amber-500",
                danger: "text-red-600",
            },
        },
        Theme {
            key: "dark",
            name: "Dark",
            palette: Palette {
                primary: "bg-blue-500",
                accent: "text-indigo-300",
                background: "bg-gray-900",
                surface: "bg-gray-800",
                text: "text-gray-100",
                muted: "text-gray-400",
                success: "text-green-400",
                warning: "text-amber-300",
                danger: "text-red-400",
            },
        },
        Theme {
            key: "corporate",
            name: "Corporate Blue",
            palette: Palette {
                primary: "bg-sky-800",
                accent: "text-sky-600",
                background: "bg-slate-100",
                surface: "bg-white",
                text: "text-slate-900",
                muted: "text-slate-500",
                success: "text-emerald-600",
                warning: "text-orange-500",
                danger: "text-rose-600",
            },
        },
        Theme {
            key: "emerald",
            name: "Emerald",
            palette: Palette {
                primary: "bg-emerald-600",
                accent: "text-teal-500",
                background: "bg-emerald-50",
                surface: "bg-white",
                text: "text-emerald-950",
                muted: "text-emerald-700",
                success: "text-green-600",
                warning: "text-yellow-600",
                danger: "text-red-600",
            },
        },
    ]
}
