//! React frontend skeletons (Vite + TypeScript)

use serde_json::{Map, Value, json};

use super::{TemplateConfig, TemplateSet, Vars, render, slug};
use crate::types::CloudProvider;

const APP_TSX: &str = r#"import React from 'react';
import { BrowserRouter as Router, Routes, Route } from 'react-router-dom';{{auth_imports}}
import './App.css';

import Header from './components/Header';
import Home from './pages/Home';
import Dashboard from './pages/Dashboard';
import { ApiProvider } from './services/api';
{{auth_setup}}
function App() {
  return (
    {{auth_open}}
      <ApiProvider>
        <Router>
          <div className="App">
            <Header />
            <main>
              <Routes>
                <Route path="/" element={<Home />} />
                <Route path="/dashboard" element={<Dashboard />} />
              </Routes>
            </main>
          </div>
        </Router>
      </ApiProvider>
    {{auth_close}}
  );
}

export default App;
"#;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <link rel="icon" href="/favicon.ico" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />{{pwa_meta}}
    <title>{{app_name}}</title>
  </head>
  <body>
    <noscript>You need to enable JavaScript to run this app.</noscript>
    <div id="root"></div>
    <script type="module" src="/src/main.tsx"></script>
  </body>
</html>
"#;

const API_TS: &str = r#"import axios from 'axios';
import React, { createContext, useContext, ReactNode } from 'react';{{interceptor_import}}

const api = axios.create({
  baseURL: import.meta.env.VITE_API_BASE_URL,
  timeout: 10000,
  headers: {
    'Content-Type': 'application/json',
  },
});
{{interceptor}}
api.interceptors.response.use(
  (response) => response,
  (error) => {
    if (error.response?.status === 401) {
      console.error('Unauthorized access');
    }
    return Promise.reject(error);
  }
);

export const apiService = {
  getItems: () => api.get('/items'),
  getItem: (id: string) => api.get(`/items/${id}`),
  createItem: (item: unknown) => api.post('/items', item),
  healthCheck: () => api.get('/health'),
};

interface ApiContextType {
  api: typeof apiService;
}

const ApiContext = createContext<ApiContextType | undefined>(undefined);

export const ApiProvider: React.FC<{ children: ReactNode }> = ({ children }) => (
  <ApiContext.Provider value={{ api: apiService }}>{children}</ApiContext.Provider>
);

export const useApi = (): ApiContextType => {
  const context = useContext(ApiContext);
  if (!context) {
    throw new Error('useApi must be used within an ApiProvider');
  }
  return context;
};

export default api;
"#;

const AWS_EXPORTS: &str = r#"const awsconfig = {
  Auth: {
    region: import.meta.env.VITE_AWS_REGION,
    userPoolId: import.meta.env.VITE_AWS_USER_POOL_ID,
    userPoolWebClientId: import.meta.env.VITE_AWS_USER_POOL_WEB_CLIENT_ID,
    mandatorySignIn: {{auth_enabled}},
    authenticationFlowType: 'USER_SRP_AUTH'
  },
  API: {
    endpoints: [
      {
        name: 'api',
        endpoint: import.meta.env.VITE_AWS_API_GATEWAY_URL,
        region: import.meta.env.VITE_AWS_REGION
      }
    ]
  },
  Storage: {
    AWSS3: {
      bucket: import.meta.env.VITE_AWS_S3_BUCKET,
      region: import.meta.env.VITE_AWS_REGION
    }
  }
};

export default awsconfig;
"#;

const AZURE_AUTH_TS: &str = r#"import { PublicClientApplication } from '@azure/msal-browser';

const msalConfig = {
  auth: {
    clientId: import.meta.env.VITE_AZURE_CLIENT_ID,
    authority: `https://login.microsoftonline.com/${import.meta.env.VITE_AZURE_TENANT_ID}`,
    redirectUri: import.meta.env.VITE_AZURE_REDIRECT_URI,
  },
  cache: {
    cacheLocation: 'sessionStorage',
    storeAuthStateInCookie: false,
  },
};

export const msalInstance = new PublicClientApplication(msalConfig);

export const loginRequest = {
  scopes: ['User.Read', 'openid', 'profile'],
};
"#;

const AWS_AUTH_WRAPPER: &str = r#"import React from 'react';
import { Authenticator } from '@aws-amplify/ui-react';
import '@aws-amplify/ui-react/styles.css';

interface AuthWrapperProps {
  children: React.ReactNode;
}

const AuthWrapper: React.FC<AuthWrapperProps> = ({ children }) => (
  <Authenticator>
    {({ signOut, user }) => (
      <div>
        <nav>
          <button onClick={signOut}>Sign Out ({user?.username})</button>
        </nav>
        {children}
      </div>
    )}
  </Authenticator>
);

export default AuthWrapper;
"#;

const AZURE_AUTH_WRAPPER: &str = r#"import React from 'react';
import { useMsal, useIsAuthenticated } from '@azure/msal-react';
import { loginRequest } from '../services/auth';

interface AuthWrapperProps {
  children: React.ReactNode;
}

const AuthWrapper: React.FC<AuthWrapperProps> = ({ children }) => {
  const { instance } = useMsal();
  const isAuthenticated = useIsAuthenticated();

  if (!isAuthenticated) {
    return (
      <div style={{ textAlign: 'center', padding: '50px' }}>
        <h2>Please sign in to continue</h2>
        <button onClick={() => instance.loginPopup(loginRequest)}>Sign In</button>
      </div>
    );
  }

  return (
    <div>
      <nav>
        <button onClick={() => instance.logoutPopup()}>Sign Out</button>
      </nav>
      {children}
    </div>
  );
};

export default AuthWrapper;
"#;

const CONSTANTS_TS: &str = r#"export const APP_CONFIG = {
  name: '{{app_name}}',
  version: '0.1.0',
  cloudProvider: '{{provider_upper}}',
  authEnabled: {{auth_enabled}},
};

export const API_ENDPOINTS = {
  ITEMS: '/items',
  HEALTH: '/health',
};
"#;

const VITE_CONFIG: &str = r#"import { defineConfig } from 'vite'
import react from '@vitejs/plugin-react'

export default defineConfig({
  plugins: [react()],
  server: {
    port: 3000,
    proxy: {
      '/api': {
        target: '{{api_endpoint}}',
        changeOrigin: true,
      },
    },
  },
  build: {
    outDir: 'build',
    sourcemap: true,
  },
})
"#;

const TSCONFIG: &str = r#"{
  "compilerOptions": {
    "target": "ES2020",
    "useDefineForClassFields": true,
    "lib": ["ES2020", "DOM", "DOM.Iterable"],
    "module": "ESNext",
    "skipLibCheck": true,
    "moduleResolution": "bundler",
    "resolveJsonModule": true,
    "isolatedModules": true,
    "noEmit": true,
    "jsx": "react-jsx",
    "strict": true,
    "noUnusedLocals": true,
    "noUnusedParameters": true,
    "noFallthroughCasesInSwitch": true
  },
  "include": ["src"]
}
"#;

const MANIFEST: &str = r##"{
  "short_name": "{{app_name}}",
  "name": "{{app_name}}",
  "icons": [
    {
      "src": "favicon.ico",
      "sizes": "64x64 32x32 24x24 16x16",
      "type": "image/x-icon"
    }
  ],
  "start_url": ".",
  "display": "standalone",
  "theme_color": "#000000",
  "background_color": "#ffffff"
}
"##;

const AWS_AUTH_INTERCEPTOR: &str = r#"
api.interceptors.request.use(async (config) => {
  try {
    const token = (await Auth.currentSession()).getIdToken().getJwtToken();
    config.headers.Authorization = `Bearer ${token}`;
  } catch (error) {
    console.error('Failed to get auth token:', error);
  }
  return config;
});
"#;

const AZURE_AUTH_INTERCEPTOR: &str = r#"
api.interceptors.request.use(async (config) => {
  const accounts = msalInstance.getAllAccounts();
  if (accounts.length > 0) {
    try {
      const response = await msalInstance.acquireTokenSilent({
        scopes: ['User.Read'],
        account: accounts[0],
      });
      config.headers.Authorization = `Bearer ${response.accessToken}`;
    } catch (error) {
      console.error('Failed to get auth token:', error);
    }
  }
  return config;
});
"#;

fn vars(config: &TemplateConfig, provider: CloudProvider) -> Vars {
    let auth = config.authentication;
    let (auth_imports, auth_setup, auth_open, auth_close, interceptor_import, interceptor) =
        match (auth, provider) {
            (false, _) => ("", "", "<>", "</>", "", ""),
            (true, CloudProvider::Aws) => (
                "\nimport { Authenticator } from '@aws-amplify/ui-react';\nimport { Amplify } from 'aws-amplify';\nimport awsExports from './aws-exports';",
                "\nAmplify.configure(awsExports);\n",
                "<Authenticator.Provider>",
                "</Authenticator.Provider>",
                "\nimport { Auth } from 'aws-amplify';",
                AWS_AUTH_INTERCEPTOR,
            ),
            (true, CloudProvider::Azure) => (
                "\nimport { MsalProvider } from '@azure/msal-react';\nimport { msalInstance } from './services/auth';",
                "",
                "<MsalProvider instance={msalInstance}>",
                "</MsalProvider>",
                "\nimport { msalInstance } from './auth';",
                AZURE_AUTH_INTERCEPTOR,
            ),
        };

    let pwa_meta = if config.pwa {
        "\n    <meta name=\"theme-color\" content=\"#000000\" />\n    <link rel=\"manifest\" href=\"/manifest.json\" />"
    } else {
        ""
    };

    Vars::from([
        ("app_name", config.app_name.trim().to_string()),
        ("provider_upper", provider.as_str().to_uppercase()),
        ("api_endpoint", config.api_endpoint.clone()),
        ("auth_enabled", auth.to_string()),
        ("auth_imports", auth_imports.to_string()),
        ("auth_setup", auth_setup.to_string()),
        ("auth_open", auth_open.to_string()),
        ("auth_close", auth_close.to_string()),
        ("interceptor_import", interceptor_import.to_string()),
        ("interceptor", interceptor.to_string()),
        ("pwa_meta", pwa_meta.to_string()),
    ])
}

fn package_json(config: &TemplateConfig, provider: CloudProvider) -> String {
    let mut dependencies = Map::new();
    for (name, version) in [
        ("react", "^18.2.0"),
        ("react-dom", "^18.2.0"),
        ("react-router-dom", "^6.8.0"),
        ("axios", "^1.3.0"),
    ] {
        dependencies.insert(name.into(), Value::from(version));
    }
    let cloud: &[(&str, &str)] = match provider {
        CloudProvider::Aws => &[("aws-amplify", "^5.0.0"), ("@aws-amplify/ui-react", "^4.0.0")],
        CloudProvider::Azure => &[
            ("@azure/msal-react", "^1.5.0"),
            ("@azure/msal-browser", "^2.35.0"),
            ("@azure/storage-blob", "^12.13.0"),
        ],
    };
    for (name, version) in cloud {
        dependencies.insert((*name).into(), Value::from(*version));
    }

    let mut dev = Map::new();
    for (name, version) in [
        ("@vitejs/plugin-react", "^3.1.0"),
        ("vite", "^4.1.0"),
        ("vitest", "^0.28.0"),
        ("eslint", "^8.34.0"),
    ] {
        dev.insert(name.into(), Value::from(version));
    }
    if config.typescript {
        for (name, version) in [
            ("typescript", "^4.9.3"),
            ("@types/react", "^18.0.27"),
            ("@types/react-dom", "^18.0.10"),
        ] {
            dev.insert(name.into(), Value::from(version));
        }
    }

    let build = if config.typescript { "tsc && vite build" } else { "vite build" };
    let package = json!({
        "name": slug(&config.app_name),
        "private": true,
        "version": "0.1.0",
        "type": "module",
        "scripts": {
            "dev": "vite",
            "build": build,
            "preview": "vite preview",
            "test": "vitest",
        },
        "dependencies": dependencies,
        "devDependencies": dev,
    });

    // Serializing a Value cannot fail
    let mut text = serde_json::to_string_pretty(&package).unwrap_or_default();
    text.push('\n');
    text
}

fn env_example(config: &TemplateConfig, provider: CloudProvider, vars: &Vars) -> String {
    let mut lines = vec![
        "# API Configuration".to_string(),
        format!("VITE_API_BASE_URL={}", config.api_endpoint),
        format!("VITE_APP_NAME={}", vars["app_name"]),
        String::new(),
        "# Cloud Provider Configuration".to_string(),
        format!("VITE_CLOUD_PROVIDER={}", vars["provider_upper"]),
        String::new(),
    ];
    let provider_lines: &[&str] = match provider {
        CloudProvider::Aws => &[
            "# AWS Configuration",
            "VITE_AWS_REGION=us-east-1",
            "VITE_AWS_USER_POOL_ID=your-user-pool-id",
            "VITE_AWS_USER_POOL_WEB_CLIENT_ID=your-client-id",
            "VITE_AWS_API_GATEWAY_URL=https://your-api-id.execute-api.region.amazonaws.com/prod",
            "VITE_AWS_S3_BUCKET=your-bucket",
        ],
        CloudProvider::Azure => &[
            "# Azure Configuration",
            "VITE_AZURE_CLIENT_ID=your-client-id",
            "VITE_AZURE_TENANT_ID=your-tenant-id",
            "VITE_AZURE_REDIRECT_URI=http://localhost:3000",
        ],
    };
    lines.extend(provider_lines.iter().map(|l| l.to_string()));
    lines.push(String::new());
    lines.push(format!("VITE_AUTH_ENABLED={}", config.authentication));
    lines.join("\n") + "\n"
}

pub(super) fn generate(config: &TemplateConfig, provider: CloudProvider) -> TemplateSet {
    let vars = vars(config, provider);
    let mut files = TemplateSet::new();

    files.insert("package.json".into(), package_json(config, provider));
    files.insert("src/App.tsx".into(), render(APP_TSX, &vars));
    files.insert("public/index.html".into(), render(INDEX_HTML, &vars));
    files.insert(".env.example".into(), env_example(config, provider, &vars));
    files.insert("src/services/api.ts".into(), render(API_TS, &vars));

    match provider {
        CloudProvider::Aws => {
            files.insert("src/aws-exports.ts".into(), render(AWS_EXPORTS, &vars));
        }
        CloudProvider::Azure => {
            files.insert("src/services/auth.ts".into(), AZURE_AUTH_TS.to_string());
        }
    }

    if config.authentication {
        let wrapper = match provider {
            CloudProvider::Aws => AWS_AUTH_WRAPPER,
            CloudProvider::Azure => AZURE_AUTH_WRAPPER,
        };
        files.insert("src/components/AuthWrapper.tsx".into(), wrapper.to_string());
    }

    files.insert("src/utils/constants.ts".into(), render(CONSTANTS_TS, &vars));
    files.insert("vite.config.ts".into(), render(VITE_CONFIG, &vars));

    if config.typescript {
        files.insert("tsconfig.json".into(), TSCONFIG.to_string());
    }
    if config.pwa {
        files.insert("public/manifest.json".into(), render(MANIFEST, &vars));
    }

    files
}
